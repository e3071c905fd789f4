//! Payment Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::bookings::records::BookingUuid, uuids::TypedUuid};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Prefix of generated payment intent references.
pub const INTENT_REF_PREFIX: &str = "pi_";

/// Prefix of placeholder transaction references.
pub const TRANSACTION_REF_PREFIX: &str = "txn_";

#[derive(Debug, Error)]
#[error("unknown payment {kind} `{value}`")]
pub struct UnknownPaymentValue {
    kind: &'static str,
    value: String,
}

/// Gateway a payment goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Stripe,
    Paypal,
    Razorpay,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Paypal => "paypal",
            Self::Razorpay => "razorpay",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stripe" => Ok(Self::Stripe),
            "paypal" => Ok(Self::Paypal),
            "razorpay" => Ok(Self::Razorpay),
            other => Err(UnknownPaymentValue {
                kind: "method",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownPaymentValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Refund recorded against a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundDetails {
    pub amount: u64,
    pub reason: Option<String>,
    pub refunded_at: Timestamp,
}

/// Gateway-specific data stored with a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundDetails>,
}

/// Payment Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub booking_uuid: BookingUuid,

    /// Minor units of `currency`.
    pub amount: u64,

    /// Upper-case ISO 4217 code.
    pub currency: String,

    pub method: PaymentMethod,
    pub intent_ref: String,
    pub status: PaymentStatus,
    pub transaction_ref: Option<String>,
    pub metadata: PaymentMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Generate an intent reference, `pi_` followed by a hyphenless UUID.
#[must_use]
pub fn intent_ref() -> String {
    format!("{INTENT_REF_PREFIX}{}", uuid::Uuid::now_v7().simple())
}

/// Generate a placeholder transaction reference.
#[must_use]
pub fn transaction_ref() -> String {
    format!("{TRANSACTION_REF_PREFIX}{}", uuid::Uuid::now_v7().simple())
}
