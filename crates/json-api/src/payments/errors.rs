//! Payment Errors

use rentals_app::domain::payments::PaymentsServiceError;
use serde_json::json;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: PaymentsServiceError) -> ApiError {
    match error {
        PaymentsServiceError::AlreadyExists => {
            ApiError::conflict("PAYMENT_EXISTS", "Payment already exists")
        }
        PaymentsServiceError::NotFound => {
            ApiError::not_found("PAYMENT_NOT_FOUND", "Payment not found")
        }
        PaymentsServiceError::BookingNotFound => {
            ApiError::not_found("BOOKING_NOT_FOUND", "Booking not found")
        }
        PaymentsServiceError::AccessDenied => ApiError::forbidden("ACCESS_DENIED", "Access denied"),
        PaymentsServiceError::AmountOutOfRange { max, .. } => ApiError::bad_request(
            "INVALID_AMOUNT",
            format!("Amount must be between 1 and {max}"),
        ),
        PaymentsServiceError::InvalidRefundAmount {
            requested,
            payment_amount,
        } => ApiError::bad_request(
            "INVALID_REFUND_AMOUNT",
            format!("Refund amount must be between 1 and {payment_amount}"),
        )
        .with_details(json!({ "requested": requested, "paymentAmount": payment_amount })),
        PaymentsServiceError::InvalidCurrency(source) => {
            ApiError::bad_request("INVALID_CURRENCY", source.to_string())
        }
        PaymentsServiceError::InvalidPaymentStatus(status) => ApiError::bad_request(
            "INVALID_PAYMENT_STATUS",
            format!("Payment is {status}"),
        )
        .with_details(json!({ "status": status.as_str() })),
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => ApiError::validation("Invalid payment data"),
        PaymentsServiceError::Sql(source) => ApiError::internal("payment storage error", source),
        PaymentsServiceError::InvalidAmount(source) => {
            ApiError::internal("payment amount out of range", source)
        }
    }
}
