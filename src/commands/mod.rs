//! CLI command definitions and dispatch.

pub mod identity;
pub mod migrate;
pub mod role;
pub mod seed;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use gatehouse_core::error::AppError;

/// Gatehouse — Identity & Access Platform
#[derive(Debug, Parser)]
#[command(name = "gatehouse", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (reads config/default.toml plus
    /// config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Seed the permission catalogue, SuperAdmin role, and admin identity
    Seed(seed::SeedArgs),
    /// Identity management
    Identity(identity::IdentityArgs),
    /// Role catalogue
    Role(role::RoleArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Seed(args) => seed::execute(args, &self.env).await,
            Commands::Identity(args) => identity::execute(args, &self.env, self.format).await,
            Commands::Role(args) => role::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for the selected environment
pub fn load_config(env: &str) -> Result<gatehouse_core::config::AppConfig, AppError> {
    gatehouse_core::config::AppConfig::load(env)
}

/// Helper: create database pool from config
pub async fn create_db_pool(
    config: &gatehouse_core::config::AppConfig,
) -> Result<sqlx::PgPool, AppError> {
    let pool = gatehouse_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
