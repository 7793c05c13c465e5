//! Database migration CLI command.

use clap::Args;

use crate::output;
use gatehouse_core::error::AppError;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Execute pending migrations
pub async fn execute(_args: &MigrateArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    gatehouse_database::migration::run_migrations(&pool).await?;

    output::print_success("Migrations applied");
    Ok(())
}
