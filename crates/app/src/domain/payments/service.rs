//! Payments service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    auth::Principal,
    database::{Db, MAX_AMOUNT},
    domain::{
        bookings::{
            records::{BookingPaymentStatus, BookingRecord, BookingUuid},
            repositories::PgBookingsRepository,
        },
        payments::{
            data::{NewPaymentIntent, RefundRequest, normalize_currency},
            errors::PaymentsServiceError,
            records::{self, PaymentRecord, PaymentStatus, PaymentUuid, RefundDetails},
            repository::{PaymentInsert, PgPaymentsRepository},
        },
    },
};

/// Currency used when neither the request nor the configuration names one.
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    payments: PgPaymentsRepository,
    bookings: PgBookingsRepository,
    default_currency: String,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            payments: PgPaymentsRepository::new(),
            bookings: PgBookingsRepository::new(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Use `currency` for intents that do not specify one.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentsServiceError::InvalidCurrency`] for a malformed code.
    pub fn with_default_currency(mut self, currency: &str) -> Result<Self, PaymentsServiceError> {
        self.default_currency = normalize_currency(currency)?;

        Ok(self)
    }

    async fn get_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingRecord, PaymentsServiceError> {
        self.bookings
            .get_booking(tx, booking)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => PaymentsServiceError::BookingNotFound,
                error => error.into(),
            })
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn create_payment_intent(
        &self,
        actor: &Principal,
        intent: NewPaymentIntent,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if !(1..=MAX_AMOUNT).contains(&intent.amount) {
            return Err(PaymentsServiceError::AmountOutOfRange {
                requested: intent.amount,
                max: MAX_AMOUNT,
            });
        }

        let currency = match intent.currency.as_deref() {
            Some(code) => normalize_currency(code)?,
            None => self.default_currency.clone(),
        };

        let mut tx = self.db.begin().await?;

        let booking = self.get_booking(&mut tx, intent.booking_uuid).await?;

        if booking.customer_uuid != actor.uuid {
            return Err(PaymentsServiceError::AccessDenied);
        }

        let intent_ref = records::intent_ref();

        let payment = self
            .payments
            .create_payment(
                &mut tx,
                &PaymentInsert {
                    uuid: PaymentUuid::new(),
                    booking_uuid: booking.uuid,
                    amount: intent.amount,
                    currency: &currency,
                    method: intent.method.unwrap_or_default(),
                    intent_ref: &intent_ref,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            payment = %payment.uuid,
            booking = %booking.uuid,
            amount = payment.amount,
            currency = %payment.currency,
            method = %payment.method,
            "created payment intent"
        );

        Ok(payment)
    }

    async fn confirm_payment(
        &self,
        intent_ref: &str,
        transaction_ref: Option<String>,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut payment = self
            .payments
            .get_payment_by_intent_for_update(&mut tx, intent_ref)
            .await?;

        match payment.status {
            PaymentStatus::Succeeded => return Ok(payment),
            PaymentStatus::Refunded => {
                return Err(PaymentsServiceError::InvalidPaymentStatus(payment.status));
            }
            PaymentStatus::Pending | PaymentStatus::Failed | PaymentStatus::Cancelled => {}
        }

        payment.status = PaymentStatus::Succeeded;
        payment.transaction_ref = Some(transaction_ref.unwrap_or_else(records::transaction_ref));

        let payment = self.payments.update_payment(&mut tx, &payment).await?;

        self.bookings
            .update_payment_status(
                &mut tx,
                payment.booking_uuid,
                BookingPaymentStatus::Paid,
                Some(&payment.intent_ref),
            )
            .await?;

        tx.commit().await?;

        info!(
            payment = %payment.uuid,
            booking = %payment.booking_uuid,
            transaction_ref = payment.transaction_ref.as_deref(),
            "confirmed payment"
        );

        Ok(payment)
    }

    async fn refund_payment(
        &self,
        actor: &Principal,
        payment: PaymentUuid,
        refund: RefundRequest,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if !actor.is_admin() {
            return Err(PaymentsServiceError::AccessDenied);
        }

        let mut tx = self.db.begin().await?;

        let mut record = self.payments.get_payment_for_update(&mut tx, payment).await?;

        if record.status != PaymentStatus::Succeeded {
            return Err(PaymentsServiceError::InvalidPaymentStatus(record.status));
        }

        let amount = refund.amount.unwrap_or(record.amount);

        if amount == 0 || amount > record.amount {
            return Err(PaymentsServiceError::InvalidRefundAmount {
                requested: amount,
                payment_amount: record.amount,
            });
        }

        record.status = PaymentStatus::Refunded;
        record.metadata.refund = Some(RefundDetails {
            amount,
            reason: refund.reason,
            refunded_at: Timestamp::now(),
        });

        let record = self.payments.update_payment(&mut tx, &record).await?;

        self.bookings
            .update_payment_status(
                &mut tx,
                record.booking_uuid,
                BookingPaymentStatus::Refunded,
                None,
            )
            .await?;

        tx.commit().await?;

        info!(
            payment = %record.uuid,
            booking = %record.booking_uuid,
            refunded = amount,
            "refunded payment"
        );

        Ok(record)
    }

    async fn get_payment_status(
        &self,
        actor: &Principal,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.payments.get_payment(&mut tx, payment).await?;
        let booking = self.get_booking(&mut tx, record.booking_uuid).await?;

        if !actor.can_access(booking.customer_uuid) {
            return Err(PaymentsServiceError::AccessDenied);
        }

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Starts a pending payment for a booking owned by the actor.
    async fn create_payment_intent(
        &self,
        actor: &Principal,
        intent: NewPaymentIntent,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Marks the payment behind `intent_ref` as succeeded and its booking as
    /// paid. Confirming a succeeded payment again changes nothing.
    async fn confirm_payment(
        &self,
        intent_ref: &str,
        transaction_ref: Option<String>,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Refunds a succeeded payment. Admin only. Leaves the booking's status
    /// and inventory alone.
    async fn refund_payment(
        &self,
        actor: &Principal,
        payment: PaymentUuid,
        refund: RefundRequest,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Reads a payment belonging to one of the actor's bookings.
    async fn get_payment_status(
        &self,
        actor: &Principal,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            bookings::{BookingsService, records::BookingStatus},
            payments::records::PaymentMethod,
        },
        test::{
            TestContext,
            helpers::{admin, booking_request, create_product, customer},
        },
    };

    use super::*;

    async fn booked(ctx: &TestContext, renter: &Principal) -> TestResult<BookingRecord> {
        let tent = create_product(ctx, "Tent", 5).await?;

        Ok(ctx
            .bookings
            .create_booking(renter, booking_request(&tent, 1))
            .await?)
    }

    fn intent(booking: &BookingRecord) -> NewPaymentIntent {
        NewPaymentIntent {
            booking_uuid: booking.uuid,
            amount: booking.pricing.total,
            currency: None,
            method: None,
        }
    }

    #[tokio::test]
    async fn payment_flow_updates_booking() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let booking = booked(&ctx, &renter).await?;

        let payment = ctx
            .payments
            .create_payment_intent(&renter, intent(&booking))
            .await?;

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.currency, "USD");
        assert_eq!(payment.method, PaymentMethod::Stripe);
        assert!(payment.intent_ref.starts_with("pi_"));

        let confirmed = ctx
            .payments
            .confirm_payment(&payment.intent_ref, None)
            .await?;

        assert_eq!(confirmed.status, PaymentStatus::Succeeded);
        assert!(
            confirmed
                .transaction_ref
                .as_deref()
                .is_some_and(|t| t.starts_with("txn_"))
        );

        let booking = ctx.bookings.get_booking(&renter, booking.uuid).await?;

        assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);
        assert_eq!(booking.payment_intent_ref, Some(payment.intent_ref.clone()));

        let again = ctx
            .payments
            .confirm_payment(&payment.intent_ref, Some("txn_other".to_string()))
            .await?;

        assert_eq!(again.transaction_ref, confirmed.transaction_ref);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_intent_is_not_found_and_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let booking = booked(&ctx, &renter).await?;

        let result = ctx.payments.confirm_payment("pi_missing", None).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let unchanged = ctx.bookings.get_booking(&renter, booking.uuid).await?;

        assert_eq!(unchanged.payment_status, BookingPaymentStatus::Pending);
        assert_eq!(unchanged.updated_at, booking.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn create_intent_checks_booking_and_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let booking = booked(&ctx, &renter).await?;

        let result = ctx
            .payments
            .create_payment_intent(&customer(), intent(&booking))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AccessDenied)),
            "expected AccessDenied, got {result:?}"
        );

        let mut missing = intent(&booking);
        missing.booking_uuid = BookingUuid::new();

        let result = ctx.payments.create_payment_intent(&renter, missing).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::BookingNotFound)),
            "expected BookingNotFound, got {result:?}"
        );

        let mut free = intent(&booking);
        free.amount = 0;

        let result = ctx.payments.create_payment_intent(&renter, free).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::AmountOutOfRange { requested: 0, .. })
            ),
            "expected AmountOutOfRange, got {result:?}"
        );

        let mut oversized = intent(&booking);
        oversized.amount = u64::MAX;

        let result = ctx.payments.create_payment_intent(&renter, oversized).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::AmountOutOfRange { requested: u64::MAX, max: MAX_AMOUNT })
            ),
            "expected AmountOutOfRange, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refund_requires_succeeded_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let staff = admin();
        let booking = booked(&ctx, &renter).await?;

        let payment = ctx
            .payments
            .create_payment_intent(&renter, intent(&booking))
            .await?;

        let result = ctx
            .payments
            .refund_payment(&staff, payment.uuid, RefundRequest::default())
            .await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::InvalidPaymentStatus(PaymentStatus::Pending))
            ),
            "expected InvalidPaymentStatus, got {result:?}"
        );

        ctx.payments
            .confirm_payment(&payment.intent_ref, Some("txn_1".to_string()))
            .await?;

        let result = ctx
            .payments
            .refund_payment(&renter, payment.uuid, RefundRequest::default())
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AccessDenied)),
            "expected AccessDenied, got {result:?}"
        );

        let result = ctx
            .payments
            .refund_payment(
                &staff,
                payment.uuid,
                RefundRequest {
                    amount: Some(payment.amount + 1),
                    reason: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::InvalidRefundAmount { .. })),
            "expected InvalidRefundAmount, got {result:?}"
        );

        let refunded = ctx
            .payments
            .refund_payment(
                &staff,
                payment.uuid,
                RefundRequest {
                    amount: None,
                    reason: Some("rained out".to_string()),
                },
            )
            .await?;

        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert_eq!(
            refunded.metadata.refund.as_ref().map(|r| (r.amount, r.reason.as_deref())),
            Some((payment.amount, Some("rained out")))
        );

        let booking = ctx.bookings.get_booking(&renter, booking.uuid).await?;

        assert_eq!(booking.payment_status, BookingPaymentStatus::Refunded);
        assert_eq!(booking.status, BookingStatus::Pending);

        let result = ctx.payments.confirm_payment(&payment.intent_ref, None).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::InvalidPaymentStatus(PaymentStatus::Refunded))
            ),
            "expected InvalidPaymentStatus, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn payment_status_is_visible_to_owner_and_admin() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let booking = booked(&ctx, &renter).await?;

        let payment = ctx
            .payments
            .create_payment_intent(
                &renter,
                NewPaymentIntent {
                    currency: Some("eur".to_string()),
                    method: Some(PaymentMethod::Paypal),
                    ..intent(&booking)
                },
            )
            .await?;

        let read = ctx.payments.get_payment_status(&renter, payment.uuid).await?;

        assert_eq!(read.currency, "EUR");
        assert_eq!(read.method, PaymentMethod::Paypal);

        ctx.payments.get_payment_status(&admin(), payment.uuid).await?;

        let result = ctx
            .payments
            .get_payment_status(&customer(), payment.uuid)
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::AccessDenied)),
            "expected AccessDenied, got {result:?}"
        );

        let result = ctx
            .payments
            .get_payment_status(&renter, PaymentUuid::new())
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
