//! Payment Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::payments::records::PaymentRecord;

use crate::{
    errors::ApiError,
    extensions::*,
    payments::errors::into_api_error,
    state::State,
};

/// Payment status summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentStatusBody {
    pub id: Uuid,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,

    pub created_at: String,
}

impl From<PaymentRecord> for PaymentStatusBody {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            id: payment.uuid.into_uuid(),
            amount: payment.amount,
            status: payment.status.as_str().to_owned(),
            method: payment.method.as_str().to_owned(),
            created_at: payment.created_at.to_string(),
            currency: payment.currency,
            transaction_ref: payment.transaction_ref,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentStatusResponse {
    pub success: bool,
    pub payment: PaymentStatusBody,
}

/// Payment Status Handler
///
/// Visible to the booking's customer and to admins.
#[endpoint(
    tags("payments"),
    summary = "Get Payment Status",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let payment = state
        .payments
        .get_payment_status(&principal, payment.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(Json(PaymentStatusResponse {
        success: true,
        payment: payment.into(),
    }))
}
