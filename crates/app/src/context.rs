//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, OpenBaoClient, OpenBaoConfig, SignedCredentialAuthService},
    database::{self, Db, PoolSettings},
    domain::{
        bookings::{BookingsService, PgBookingsService},
        payments::{PaymentsService, PaymentsServiceError, PgPaymentsService},
        products::{PgProductsService, ProductsService},
        reports::{PgReportsService, ReportsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("invalid payment settings")]
    Payments(#[source] PaymentsServiceError),
}

/// Everything needed to build an [`AppContext`].
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub pool: PoolSettings,
    pub openbao: OpenBaoConfig,

    /// Currency of payment intents that do not name one.
    pub default_currency: String,
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub bookings: Arc<dyn BookingsService>,
    pub payments: Arc<dyn PaymentsService>,
    pub reports: Arc<dyn ReportsService>,
    pub auth: Arc<dyn AuthService>,
    db: Db,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// default currency is malformed.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect_with(&settings.database_url, settings.pool)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        let payments = PgPaymentsService::new(db.clone())
            .with_default_currency(&settings.default_currency)
            .map_err(AppInitError::Payments)?;

        let signer = Arc::new(OpenBaoClient::new(settings.openbao));

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            bookings: Arc::new(PgBookingsService::new(db.clone())),
            payments: Arc::new(payments),
            reports: Arc::new(PgReportsService::new(db.clone())),
            auth: Arc::new(SignedCredentialAuthService::new(signer)),
            db,
        })
    }

    /// Close the connection pool. Call once the server has stopped.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
