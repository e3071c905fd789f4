//! Payments service errors.

use std::num::TryFromIntError;

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::payments::{data::InvalidCurrency, records::PaymentStatus};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment already exists")]
    AlreadyExists,

    #[error("payment not found")]
    NotFound,

    #[error("booking not found")]
    BookingNotFound,

    #[error("access denied")]
    AccessDenied,

    #[error("payment amount must be between 1 and {max}, got {requested}")]
    AmountOutOfRange { requested: u64, max: u64 },

    #[error("refund amount must be between 1 and {payment_amount}, got {requested}")]
    InvalidRefundAmount { requested: u64, payment_amount: u64 },

    #[error(transparent)]
    InvalidCurrency(#[from] InvalidCurrency),

    #[error("payment is {0}")]
    InvalidPaymentStatus(PaymentStatus),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount value")]
    InvalidAmount(#[from] TryFromIntError),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(|e| e.kind()) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
