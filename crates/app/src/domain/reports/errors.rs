//! Reports service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportsServiceError {
    #[error("report start must not be after its end")]
    InvalidDateRange,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
