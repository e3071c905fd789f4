//! Booking Errors

use rentals_app::domain::bookings::BookingsServiceError;
use serde_json::json;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: BookingsServiceError) -> ApiError {
    match error {
        BookingsServiceError::AlreadyExists => {
            ApiError::conflict("BOOKING_EXISTS", "Booking already exists")
        }
        BookingsServiceError::NotFound => {
            ApiError::not_found("BOOKING_NOT_FOUND", "Booking not found")
        }
        BookingsServiceError::AccessDenied => ApiError::forbidden("ACCESS_DENIED", "Access denied"),
        BookingsServiceError::InvalidStatusTransition(transition) => {
            ApiError::bad_request(
                "INVALID_STATUS",
                format!(
                    "Cannot move booking from {} to {}",
                    transition.from, transition.to
                ),
            )
            .with_details(json!({
                "from": transition.from.as_str(),
                "to": transition.to.as_str(),
            }))
        }
        BookingsServiceError::MissingItems => {
            ApiError::validation("A booking needs at least one item")
        }
        BookingsServiceError::InvalidDateRange => {
            ApiError::bad_request("INVALID_DATES", "End date must be after start date")
        }
        BookingsServiceError::StartDateInPast => {
            ApiError::bad_request("INVALID_START_DATE", "Start date cannot be in the past")
        }
        BookingsServiceError::InvalidReturnDate => ApiError::bad_request(
            "INVALID_RETURN_DATE",
            "Actual return date cannot precede the start date",
        ),
        BookingsServiceError::ProductNotFound(product) => {
            ApiError::bad_request("PRODUCT_NOT_FOUND", format!("Product not found: {product}"))
                .with_details(json!({ "product": product.to_string() }))
        }
        BookingsServiceError::ProductInactive(product) => ApiError::bad_request(
            "PRODUCT_NOT_FOUND",
            format!("Product is not available for rent: {product}"),
        )
        .with_details(json!({ "product": product.to_string() })),
        BookingsServiceError::InsufficientInventory(product) => ApiError::bad_request(
            "INSUFFICIENT_INVENTORY",
            format!("Insufficient inventory for product: {product}"),
        )
        .with_details(json!({ "product": product.to_string() })),
        BookingsServiceError::InvalidRentalTerms(source) => {
            ApiError::bad_request("INVALID_RENTAL_TERMS", source.to_string())
        }
        BookingsServiceError::PricingMismatch(source) => ApiError::bad_request(
            "PRICING_MISMATCH",
            source.map_or_else(
                || "Quoted total does not match the current prices".to_string(),
                |source| source.to_string(),
            ),
        ),
        BookingsServiceError::InvalidReference
        | BookingsServiceError::MissingRequiredData
        | BookingsServiceError::InvalidData => ApiError::validation("Invalid booking data"),
        error @ (BookingsServiceError::InventoryOutOfSync(_)
        | BookingsServiceError::BookingNumberExhausted) => {
            ApiError::internal("booking invariant violated", error)
        }
        BookingsServiceError::Sql(source) => ApiError::internal("booking storage error", source),
        BookingsServiceError::InvalidAmount(source) => {
            ApiError::internal("booking amount out of range", source)
        }
    }
}
