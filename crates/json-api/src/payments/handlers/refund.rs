//! Refund Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::payments::data::RefundRequest;

use crate::{
    errors::ApiError,
    extensions::*,
    observability::record_payment_event,
    payments::{errors::into_api_error, models::PaymentResponse},
    state::State,
};

/// Refund Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefundPaymentRequest {
    pub payment_id: Uuid,

    /// Minor currency units, defaults to the full payment amount
    #[serde(default)]
    pub amount: Option<u64>,

    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RefundPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: PaymentResponse,
}

/// Refund Payment Handler
///
/// Admin only. Refunds a succeeded payment without touching the booking's
/// status or inventory.
#[endpoint(
    tags("payments"),
    summary = "Refund Payment",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "payments.refund",
    skip(json, depot),
    fields(payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<RefundPaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<RefundPaymentResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    tracing::Span::current().record("payment_uuid", tracing::field::display(request.payment_id));

    let refund = RefundRequest {
        amount: request.amount,
        reason: request.reason.filter(|reason| !reason.trim().is_empty()),
    };

    let payment = state
        .payments
        .refund_payment(&principal, request.payment_id.into(), refund)
        .await
        .map_err(into_api_error)?;

    record_payment_event("refund", payment.status.as_str());

    tracing::info!(
        amount = payment.metadata.refund.as_ref().map(|refund| refund.amount),
        "payment refunded"
    );

    Ok(Json(RefundPaymentResponse {
        success: true,
        message: "Refund processed successfully".to_owned(),
        payment: payment.into(),
    }))
}
