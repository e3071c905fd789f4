//! Create Payment Intent Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::payments::{data::NewPaymentIntent, records::PaymentMethod};

use crate::{
    errors::ApiError,
    extensions::*,
    observability::record_payment_event,
    payments::{errors::into_api_error, models::PaymentResponse},
    state::State,
};

/// Create Payment Intent Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateIntentRequest {
    #[serde(default)]
    pub booking_id: Option<Uuid>,

    /// Minor currency units
    #[serde(default)]
    pub amount: Option<u64>,

    /// ISO 4217 code, defaults to the configured currency
    #[serde(default)]
    pub currency: Option<String>,

    /// `stripe`, `paypal` or `razorpay`, defaults to `stripe`
    #[serde(default)]
    pub method: Option<String>,
}

impl CreateIntentRequest {
    fn into_intent(self) -> Result<NewPaymentIntent, ApiError> {
        let (Some(booking), Some(amount)) = (self.booking_id, self.amount) else {
            return Err(ApiError::bad_request(
                "MISSING_REQUIRED_FIELDS",
                "Booking ID and amount are required",
            ));
        };

        let method = self
            .method
            .map(|method| method.parse::<PaymentMethod>())
            .transpose()
            .map_err(|error| ApiError::validation(error.to_string()))?;

        Ok(NewPaymentIntent {
            booking_uuid: booking.into(),
            amount,
            currency: self.currency,
            method,
        })
    }
}

/// Gateway-facing view of a new payment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentIntentResponse {
    /// Intent reference to confirm the payment with
    pub id: String,

    pub amount: u64,

    /// Lower-case ISO 4217 code
    pub currency: String,

    /// Always `requires_payment_method`
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateIntentResponse {
    pub success: bool,
    pub payment_intent: PaymentIntentResponse,
    pub payment: PaymentResponse,
}

/// Create Payment Intent Handler
///
/// Starts a pending payment for one of the caller's bookings.
#[endpoint(
    tags("payments"),
    summary = "Create Payment Intent",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "payments.create_intent",
    skip(json, depot),
    fields(booking_uuid = tracing::field::Empty, payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateIntentRequest>,
    depot: &mut Depot,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let intent = json.into_inner().into_intent()?;

    tracing::Span::current().record("booking_uuid", tracing::field::display(intent.booking_uuid));

    let payment = state
        .payments
        .create_payment_intent(&principal, intent)
        .await
        .map_err(into_api_error)?;

    tracing::Span::current().record("payment_uuid", tracing::field::display(payment.uuid));
    record_payment_event("intent", payment.status.as_str());

    Ok(Json(CreateIntentResponse {
        success: true,
        payment_intent: PaymentIntentResponse {
            id: payment.intent_ref.clone(),
            amount: payment.amount,
            currency: payment.currency.to_ascii_lowercase(),
            status: "requires_payment_method".to_owned(),
        },
        payment: payment.into(),
    }))
}
