//! Confirm Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::ApiError,
    extensions::*,
    observability::record_payment_event,
    payments::{errors::into_api_error, models::PaymentEnvelope},
    state::State,
};

/// Confirm Payment Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,

    /// Gateway transaction reference. A placeholder is generated when absent.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Confirm Payment Handler
///
/// Marks the payment as succeeded and the booking as paid. Confirming an
/// already succeeded payment returns it unchanged.
#[endpoint(
    tags("payments"),
    summary = "Confirm Payment",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "payments.confirm",
    skip(json, depot),
    fields(payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<ConfirmPaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let Some(intent_ref) = request
        .payment_intent_id
        .filter(|intent| !intent.trim().is_empty())
    else {
        return Err(ApiError::bad_request(
            "MISSING_PAYMENT_INTENT",
            "Payment intent ID is required",
        ));
    };

    let transaction_ref = request
        .transaction_id
        .filter(|transaction| !transaction.trim().is_empty());

    let payment = state
        .payments
        .confirm_payment(intent_ref.trim(), transaction_ref)
        .await
        .map_err(into_api_error)?;

    tracing::Span::current().record("payment_uuid", tracing::field::display(payment.uuid));
    record_payment_event("confirm", payment.status.as_str());

    Ok(Json(PaymentEnvelope::new(payment)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use rentals_app::domain::{
        bookings::records::BookingUuid,
        payments::{
            PaymentsServiceError,
            records::{PaymentStatus, PaymentUuid},
        },
    };

    use crate::{
        errors::ErrorResponse,
        payments::models::fixtures::make_payment,
        test_helpers::{Mocks, customer, make_service},
    };

    use super::*;

    fn make_payments_service(mocks: Mocks) -> Service {
        make_service(
            mocks,
            Some(customer()),
            Router::with_path("payments/confirm").post(handler),
        )
    }

    #[tokio::test]
    async fn test_confirm_marks_payment_succeeded() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_confirm_payment()
            .once()
            .withf(|intent, transaction| {
                intent == "pi_abc" && transaction.as_deref() == Some("ch_123")
            })
            .return_once(|_, transaction| {
                let mut payment =
                    make_payment(PaymentUuid::new(), BookingUuid::new(), PaymentStatus::Succeeded);

                payment.transaction_ref = transaction;

                Ok(payment)
            });

        let response: PaymentEnvelope = TestClient::post("http://example.com/payments/confirm")
            .json(&json!({ "paymentIntentId": "pi_abc", "transactionId": "ch_123" }))
            .send(&make_payments_service(mocks))
            .await
            .take_json()
            .await?;

        assert_eq!(response.payment.status, "succeeded");
        assert_eq!(response.payment.transaction_id.as_deref(), Some("ch_123"));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_requires_an_intent() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.payments.expect_confirm_payment().never();

        let mut res = TestClient::post("http://example.com/payments/confirm")
            .json(&json!({ "transactionId": "ch_123" }))
            .send(&make_payments_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.error.code, "MISSING_PAYMENT_INTENT");

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_unknown_intent_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_confirm_payment()
            .once()
            .withf(|_, transaction| transaction.is_none())
            .return_once(|_, _| Err(PaymentsServiceError::NotFound));

        let mut res = TestClient::post("http://example.com/payments/confirm")
            .json(&json!({ "paymentIntentId": "pi_missing" }))
            .send(&make_payments_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert_eq!(body.error.code, "PAYMENT_NOT_FOUND");

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_refunded_payment_returns_invalid_status() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::InvalidPaymentStatus(PaymentStatus::Refunded))
            });

        let mut res = TestClient::post("http://example.com/payments/confirm")
            .json(&json!({ "paymentIntentId": "pi_abc" }))
            .send(&make_payments_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.error.code, "INVALID_PAYMENT_STATUS");
        assert_eq!(body.error.message, "Payment is refunded");

        Ok(())
    }
}
