//! Bookings service errors.

use std::num::TryFromIntError;

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::{
    bookings::{pricing::PricingError, status::InvalidTransition},
    products::records::ProductUuid,
};

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("booking already exists")]
    AlreadyExists,

    #[error("booking not found")]
    NotFound,

    #[error("access denied")]
    AccessDenied,

    #[error(transparent)]
    InvalidStatusTransition(#[from] InvalidTransition),

    #[error("a booking needs at least one item")]
    MissingItems,

    #[error("end date must be after start date")]
    InvalidDateRange,

    #[error("start date cannot be in the past")]
    StartDateInPast,

    #[error("actual return date cannot precede the start date")]
    InvalidReturnDate,

    #[error("product not found: {0}")]
    ProductNotFound(ProductUuid),

    #[error("product is not available for rent: {0}")]
    ProductInactive(ProductUuid),

    #[error("insufficient inventory for product: {0}")]
    InsufficientInventory(ProductUuid),

    #[error("invalid rental terms")]
    InvalidRentalTerms(#[source] PricingError),

    #[error("pricing does not match")]
    PricingMismatch(#[source] Option<PricingError>),

    #[error("inventory for product {0} is out of sync with its bookings")]
    InventoryOutOfSync(ProductUuid),

    #[error("could not allocate a unique booking number")]
    BookingNumberExhausted,

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

impl From<PricingError> for BookingsServiceError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::UnitPriceMismatch { .. } | PricingError::Overflow => {
                Self::PricingMismatch(Some(error))
            }
            PricingError::UnknownProduct(product) => Self::ProductNotFound(product),
            PricingError::RentalUnitNotOffered { .. } | PricingError::DurationOutOfRange { .. } => {
                Self::InvalidRentalTerms(error)
            }
        }
    }
}

impl From<Error> for BookingsServiceError {
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
