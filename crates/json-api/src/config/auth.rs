//! Auth Config

use clap::Args;

use rentals_app::auth::OpenBaoConfig;

/// `OpenBao` authentication settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// `OpenBao` server address
    #[arg(long, env = "OPENBAO_ADDR")]
    pub addr: String,

    /// `OpenBao` authentication token
    #[arg(long, env = "OPENBAO_TOKEN", hide_env_values = true)]
    pub token: String,

    /// `OpenBao` Transit key used to verify bearer credentials
    #[arg(long, env = "OPENBAO_TRANSIT_KEY")]
    pub transit_key: String,
}

impl AuthConfig {
    #[must_use]
    pub fn openbao_config(&self) -> OpenBaoConfig {
        OpenBaoConfig {
            addr: self.addr.clone(),
            token: self.token.clone(),
            transit_key: self.transit_key.clone(),
        }
    }
}
