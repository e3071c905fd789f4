//! Logging Config

use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One line per event, for terminals.
    #[default]
    Compact,

    /// Newline-delimited JSON, for log shippers.
    Json,
}

/// Logging settings. `RUST_LOG`, when set, replaces the level entirely.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Default level for this service's own events
    #[arg(short = 'l', long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub level: String,

    #[arg(long = "log-format", env = "LOG_FORMAT", value_enum, default_value_t)]
    pub format: LogFormat,
}
