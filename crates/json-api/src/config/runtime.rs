//! Runtime Config

use std::time::Duration;

use clap::Args;

/// Request handling settings.
#[derive(Debug, Args)]
pub struct RuntimeConfig {
    /// Threshold for slow request warnings.
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000_u64)]
    pub slow_request_threshold_ms: u64,

    /// Include underlying error text in 500 responses. Never enable in production.
    #[arg(long, env = "EXPOSE_ERROR_DETAILS", default_value_t = false)]
    pub expose_error_details: bool,

    /// ISO 4217 currency of payment intents that do not name one.
    #[arg(long, env = "DEFAULT_CURRENCY", default_value = "USD")]
    pub default_currency: String,

    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[arg(long, env = "SHUTDOWN_GRACE_SECONDS", default_value_t = 30_u64)]
    pub shutdown_grace_seconds: u64,
}

impl RuntimeConfig {
    /// Drain window handed to the server on shutdown.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}
