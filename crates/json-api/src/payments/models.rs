//! Payment response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::payments::records::{PaymentRecord, RefundDetails};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefundResponse {
    pub amount: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub refunded_at: String,
}

impl From<RefundDetails> for RefundResponse {
    fn from(refund: RefundDetails) -> Self {
        Self {
            amount: refund.amount,
            reason: refund.reason,
            refunded_at: refund.refunded_at.to_string(),
        }
    }
}

/// Payment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentResponse {
    pub id: Uuid,

    /// Booking ID
    pub booking: Uuid,

    /// Minor units of `currency`
    pub amount: u64,

    /// Upper-case ISO 4217 code
    pub currency: String,

    /// `stripe`, `paypal` or `razorpay`
    pub method: String,

    pub payment_intent_id: String,

    /// `pending`, `succeeded`, `failed`, `cancelled` or `refunded`
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundResponse>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            id: payment.uuid.into_uuid(),
            booking: payment.booking_uuid.into_uuid(),
            amount: payment.amount,
            method: payment.method.as_str().to_owned(),
            status: payment.status.as_str().to_owned(),
            refund: payment.metadata.refund.map(Into::into),
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
            currency: payment.currency,
            payment_intent_id: payment.intent_ref,
            transaction_id: payment.transaction_ref,
        }
    }
}

/// Single payment envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentEnvelope {
    pub success: bool,
    pub payment: PaymentResponse,
}

impl PaymentEnvelope {
    pub(crate) fn new(payment: PaymentRecord) -> Self {
        Self {
            success: true,
            payment: payment.into(),
        }
    }
}
