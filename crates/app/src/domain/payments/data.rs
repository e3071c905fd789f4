//! Payments Data

use thiserror::Error;

use crate::domain::{bookings::records::BookingUuid, payments::records::PaymentMethod};

/// Request to start a payment for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    pub booking_uuid: BookingUuid,

    /// Minor units, strictly positive.
    pub amount: u64,

    /// ISO 4217 code in any case. Falls back to the configured default.
    pub currency: Option<String>,

    pub method: Option<PaymentMethod>,
}

/// Refund request. `amount` defaults to the full payment amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundRequest {
    pub amount: Option<u64>,
    pub reason: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid currency code `{0}`")]
pub struct InvalidCurrency(pub String);

/// Upper-case a three-letter currency code.
///
/// # Errors
///
/// Returns [`InvalidCurrency`] unless `code` is exactly three ASCII letters.
pub fn normalize_currency(code: &str) -> Result<String, InvalidCurrency> {
    let code = code.trim();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(InvalidCurrency(code.to_string()));
    }

    Ok(code.to_ascii_uppercase())
}
