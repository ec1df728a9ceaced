//! User subcommands

use clap::Subcommand;
use serde_json::{json, Value};

use crate::domain::{CreateUserInput, UpdateUserInput, UserRepository};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },

    /// Show a user by id
    Get { id: String },

    /// List every user, oldest first
    List,

    /// Change a user's name and/or email
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Delete a user by id
    Delete { id: String },

    /// Look a user up by email; prints null when absent
    FindByEmail { email: String },
}

pub async fn execute(command: UserCommand, repository: &dyn UserRepository) -> anyhow::Result<Value> {
    let output = match command {
        UserCommand::Create { name, email } => {
            json!(repository.create(&CreateUserInput::new(name, email)).await?)
        }
        UserCommand::Get { id } => json!(repository.find_by_id(&id).await?),
        UserCommand::List => json!(repository.find_all().await?),
        UserCommand::Update { id, name, email } => {
            let input = UpdateUserInput { name, email };
            json!(repository.update(&id, &input).await?)
        }
        UserCommand::Delete { id } => {
            let deleted = repository.delete(&id).await?;
            json!({ "id": id, "deleted": deleted })
        }
        UserCommand::FindByEmail { email } => json!(repository.find_by_email(&email).await?),
    };

    Ok(output)
}
