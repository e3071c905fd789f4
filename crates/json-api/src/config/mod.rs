//! Server configuration module

use std::net::SocketAddr;

use clap::Parser;

use rentals_app::context::AppSettings;

use crate::config::{
    auth::AuthConfig, db::DatabaseConfig, logging::LoggingConfig, runtime::RuntimeConfig,
    server::ListenConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod logging;
pub(crate) mod runtime;
pub(crate) mod server;

/// Rentals JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "rentals-json", about = "Rentals JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Listener settings.
    #[command(flatten)]
    pub listen: ListenConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request handling settings.
    #[command(flatten)]
    pub runtime: RuntimeConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// `OpenBao` authentication settings.
    #[command(flatten)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        self.listen.socket_addr()
    }

    /// Settings for building the application context.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            database_url: self.database.database_url.clone(),
            pool: self.database.pool_settings(),
            openbao: self.auth.openbao_config(),
            default_currency: self.runtime.default_currency.clone(),
        }
    }
}
