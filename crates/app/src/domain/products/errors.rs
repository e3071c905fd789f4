//! Products service errors.

use std::num::TryFromIntError;

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::products::records::RentalUnit;

/// Name of the check constraint guarding the inventory counters.
pub(crate) const INVENTORY_CONSTRAINT: &str = "products_inventory_within_total";

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product already exists")]
    AlreadyExists,

    #[error("product not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("at least one rental unit is required")]
    MissingRentalUnits,

    #[error("rental unit durations are invalid")]
    InvalidRentalUnit,

    #[error("rental unit {0} is listed more than once")]
    DuplicateRentalUnit(RentalUnit),

    #[error("available and reserved quantities cannot exceed total quantity")]
    InvalidInventory,

    #[error("start date must be before end date")]
    InvalidDateRange,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount value")]
    InvalidAmount(#[from] TryFromIntError),
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        if database_error.constraint() == Some(INVENTORY_CONSTRAINT) {
            return Self::InvalidInventory;
        }

        match database_error.kind() {
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::ForeignKeyViolation => Self::InvalidReference,
            ErrorKind::NotNullViolation => Self::MissingRequiredData,
            ErrorKind::CheckViolation => Self::InvalidData,
            ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let error = ProductsServiceError::from(Error::RowNotFound);

        assert!(matches!(error, ProductsServiceError::NotFound));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let result = u64::try_from(-1_i64).map_err(ProductsServiceError::from);

        assert!(matches!(result, Err(ProductsServiceError::InvalidAmount(_))));
    }
}
