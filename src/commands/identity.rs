//! Identity management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use dialoguer::Password;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::identity::IdentityRepository;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_service::identity::{CreateIdentityRequest, IdentityLifecycleManager};
use gatehouse_service::notify::ChannelNotificationDispatcher;

/// Arguments for identity commands
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Identity subcommand
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands
#[derive(Debug, Subcommand)]
pub enum IdentityCommand {
    /// List all active identities
    List,
    /// Create an identity (restores a soft-deleted one with the same email)
    Create {
        /// Username
        username: String,
        /// Email address
        email: String,
        /// Role names to assign (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },
    /// Soft-delete an identity
    Delete {
        /// Identity ID
        id: Uuid,
    },
}

/// Identity display row for table output
#[derive(Debug, Serialize, Tabled)]
struct IdentityRow {
    /// Identity ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Active flag
    active: bool,
    /// Assigned role names
    roles: String,
    /// Created at
    created_at: String,
}

/// Execute identity commands
pub async fn execute(
    args: &IdentityArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    let identity_repo = Arc::new(IdentityRepository::new(pool.clone()));
    let role_repo = Arc::new(RoleRepository::new(pool.clone()));
    let lifecycle = IdentityLifecycleManager::new(
        Arc::clone(&identity_repo),
        Arc::clone(&role_repo),
        Arc::new(PasswordHasher::new()),
        Arc::new(PasswordValidator::new(&config.auth)),
        Arc::new(ChannelNotificationDispatcher::new()),
    );

    match &args.command {
        IdentityCommand::List => {
            let identities = lifecycle.list().await?;

            let rows: Vec<IdentityRow> = identities
                .iter()
                .map(|identity| IdentityRow {
                    id: identity.id.to_string(),
                    username: identity.username.clone(),
                    email: identity.email.clone(),
                    active: identity.is_active,
                    roles: identity
                        .roles
                        .iter()
                        .map(|role| role.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    created_at: identity.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        IdentityCommand::Create {
            username,
            email,
            roles,
        } => {
            let mut role_ids = Vec::new();
            for name in roles {
                match role_repo.find_by_name(name).await? {
                    Some(role) => role_ids.push(role.id),
                    None => output::print_warning(&format!("Unknown role '{}', skipping", name)),
                }
            }

            let password = Password::new()
                .with_prompt(format!("Password for '{}'", username))
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(|e| AppError::internal(format!("Failed to read password: {e}")))?;

            let identity = lifecycle
                .create(CreateIdentityRequest {
                    username: username.clone(),
                    email: email.clone(),
                    password,
                    role_ids,
                })
                .await?;

            output::print_success(&format!(
                "Identity '{}' ready with id {}",
                identity.username, identity.id
            ));
        }
        IdentityCommand::Delete { id } => {
            lifecycle.delete(*id, None).await?;
            output::print_success(&format!("Identity {} deleted", id));
        }
    }

    Ok(())
}
