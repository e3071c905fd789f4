//! Operator subcommands.

use clap::{Parser, Subcommand};
use thiserror::Error;

use rentals_app::auth::AuthServiceError;

mod credential;
mod db;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to issue credential: {0}")]
    Credential(#[from] AuthServiceError),
}

#[derive(Debug, Parser)]
#[command(name = "rentals-app", about = "Rentals operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bearer credentials for the JSON API
    Credential(credential::CredentialCommand),

    /// Schema management
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        match self.command {
            Command::Credential(command) => command.run().await,
            Command::Db(command) => command.run().await,
        }
    }
}
