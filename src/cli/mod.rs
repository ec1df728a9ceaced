//! CLI module for the user registry
//!
//! Provides subcommands over the configured user repository:
//! - user commands (`create`, `get`, `list`, `update`, `delete`, `find-by-email`)
//! - `queries`: names the query source can resolve
//! - `init-schema`: create the users table (postgres backend)
//! - `db-info`: server version and time (postgres backend)

pub mod users;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::registry::{create_user_registry, UserRegistry};

/// User registry - create, read, update and delete users
#[derive(Debug, Parser)]
#[command(name = "user-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    User(users::UserCommand),

    /// List the SQL query names available to the repository
    Queries,

    /// Create the users table if it does not exist (postgres backend only)
    InitSchema,

    /// Show the database server version and current time (postgres backend only)
    DbInfo,
}

/// Load configuration, run one command and print its result as JSON
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let registry = create_user_registry(&config)
        .await
        .context("Failed to set up user repository")?;

    let result = execute(cli.command, &registry).await;
    registry.close().await;

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

/// Run a command against `registry` and return its JSON result
pub async fn execute(command: Command, registry: &UserRegistry) -> anyhow::Result<Value> {
    match command {
        Command::User(command) => users::execute(command, registry.repository().as_ref()).await,
        Command::Queries => Ok(json!(registry.queries().list_available().await?)),
        Command::InitSchema => {
            registry.ensure_schema().await?;
            info!("Schema initialized");
            Ok(json!({ "initialized": true }))
        }
        Command::DbInfo => Ok(serde_json::to_value(registry.database_info().await?)?),
    }
}
