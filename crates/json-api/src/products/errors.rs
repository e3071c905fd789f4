//! Product Errors

use rentals_app::domain::products::ProductsServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: ProductsServiceError) -> ApiError {
    match error {
        ProductsServiceError::AlreadyExists => {
            ApiError::conflict("PRODUCT_EXISTS", "Product already exists")
        }
        ProductsServiceError::NotFound => {
            ApiError::not_found("PRODUCT_NOT_FOUND", "Product not found")
        }
        ProductsServiceError::InvalidReference
        | ProductsServiceError::MissingRequiredData
        | ProductsServiceError::InvalidData => ApiError::validation("Invalid product data"),
        ProductsServiceError::MissingRentalUnits => {
            ApiError::validation("At least one rental unit is required")
        }
        ProductsServiceError::InvalidRentalUnit => ApiError::bad_request(
            "INVALID_RENTAL_UNIT",
            "Rental unit durations are invalid",
        ),
        ProductsServiceError::DuplicateRentalUnit(unit) => ApiError::bad_request(
            "INVALID_RENTAL_UNIT",
            format!("Rental unit {unit} is listed more than once"),
        ),
        ProductsServiceError::InvalidInventory => ApiError::bad_request(
            "INVALID_INVENTORY",
            "Available and reserved quantities cannot exceed total quantity",
        ),
        ProductsServiceError::InvalidDateRange => {
            ApiError::bad_request("INVALID_DATES", "Start date must be before end date")
        }
        ProductsServiceError::Sql(source) => ApiError::internal("product storage error", source),
        ProductsServiceError::InvalidAmount(source) => {
            ApiError::internal("product amount out of range", source)
        }
    }
}
