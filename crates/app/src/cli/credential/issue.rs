use std::sync::Arc;

use clap::Args;
use jiff::{SignedDuration, Timestamp};
use rentals_app::auth::{
    NewCredential, OpenBaoClient, OpenBaoConfig, Role, SignedCredentialAuthService,
};
use uuid::Uuid;

use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct IssueCredentialArgs {
    /// Subject UUID; generated when omitted
    #[arg(long)]
    subject: Option<Uuid>,

    /// Email address carried in the credential
    #[arg(long)]
    email: String,

    /// `customer` or `admin`
    #[arg(long, default_value = "customer")]
    role: Role,

    /// Lifetime in hours
    #[arg(long, default_value_t = 24)]
    ttl_hours: u32,

    /// OpenBao server address
    #[arg(long, env = "OPENBAO_ADDR")]
    openbao_addr: String,

    /// OpenBao authentication token
    #[arg(long, env = "OPENBAO_TOKEN", hide_env_values = true)]
    openbao_token: String,

    /// OpenBao Transit key name
    #[arg(long, env = "OPENBAO_TRANSIT_KEY")]
    openbao_transit_key: String,
}

pub(crate) async fn run(args: IssueCredentialArgs) -> Result<(), CliError> {
    if args.ttl_hours == 0 {
        return Err(CliError::InvalidArgument(
            "ttl-hours must be at least 1".to_owned(),
        ));
    }

    let expires_at = Timestamp::now()
        .checked_add(SignedDuration::from_hours(i64::from(args.ttl_hours)))
        .map_err(|error| CliError::InvalidArgument(format!("invalid ttl-hours: {error}")))?;

    let signer = Arc::new(OpenBaoClient::new(OpenBaoConfig {
        addr: args.openbao_addr,
        token: args.openbao_token,
        transit_key: args.openbao_transit_key,
    }));

    let issued = SignedCredentialAuthService::new(signer)
        .issue_credential(NewCredential {
            subject: args.subject.unwrap_or_else(Uuid::now_v7),
            email: args.email,
            role: args.role,
            expires_at,
        })
        .await?;

    println!("subject: {}", issued.principal.uuid);
    println!("email: {}", issued.principal.email);
    println!("role: {}", issued.principal.role);
    println!("issued_at: {}", issued.issued_at);
    println!("expires_at: {}", issued.expires_at);
    println!("credential: {}", issued.token);

    Ok(())
}
