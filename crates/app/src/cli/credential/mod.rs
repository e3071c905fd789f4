use clap::{Args, Subcommand};

use super::CliError;

mod issue;

#[derive(Debug, Args)]
pub(crate) struct CredentialCommand {
    #[command(subcommand)]
    action: CredentialAction,
}

#[derive(Debug, Subcommand)]
enum CredentialAction {
    /// Sign a bearer credential for a customer or administrator
    Issue(issue::IssueCredentialArgs),
}

impl CredentialCommand {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        match self.action {
            CredentialAction::Issue(args) => issue::run(args).await,
        }
    }
}
