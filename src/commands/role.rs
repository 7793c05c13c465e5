//! Role catalogue CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_service::role::RoleService;

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List all roles and their permissions
    List,
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: String,
    /// Role name
    name: String,
    /// Granted permission keys
    permissions: String,
}

/// Execute role commands
pub async fn execute(args: &RoleArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let role_service = RoleService::new(Arc::new(RoleRepository::new(pool)));

    match &args.command {
        RoleCommand::List => {
            let roles = role_service.list_roles().await?;

            let rows: Vec<RoleRow> = roles
                .iter()
                .map(|role| RoleRow {
                    id: role.id.to_string(),
                    name: role.name.clone(),
                    permissions: role
                        .permissions
                        .iter()
                        .map(|permission| permission.key.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    Ok(())
}
