//! Database seeding CLI command.

use clap::Args;
use dialoguer::Password;

use crate::output;
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_core::error::AppError;
use gatehouse_database::seeding;

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Initial admin password; prompted for when omitted
    #[arg(long)]
    pub admin_password: Option<String>,
}

/// Seed the permission catalogue, SuperAdmin role, and admin identity
pub async fn execute(args: &SeedArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    let password = match &args.admin_password {
        Some(password) => password.clone(),
        None => Password::new()
            .with_prompt("Initial admin password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| AppError::internal(format!("Failed to read password: {e}")))?,
    };

    PasswordValidator::new(&config.auth).validate(&password)?;
    let hash = PasswordHasher::new().hash(&password)?;

    seeding::seed(&pool, &hash).await?;

    output::print_success(&format!(
        "Seeded catalogue and admin identity '{}'",
        seeding::ADMIN_EMAIL
    ));
    Ok(())
}
