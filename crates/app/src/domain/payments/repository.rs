//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::{amount_to_db, decode_error, try_get_amount},
    domain::{
        bookings::records::BookingUuid,
        payments::records::{PaymentMetadata, PaymentMethod, PaymentRecord, PaymentUuid},
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const GET_PAYMENT_FOR_UPDATE_SQL: &str = include_str!("sql/get_payment_for_update.sql");
const GET_PAYMENT_BY_INTENT_FOR_UPDATE_SQL: &str =
    include_str!("sql/get_payment_by_intent_for_update.sql");
const UPDATE_PAYMENT_SQL: &str = include_str!("sql/update_payment.sql");

/// Columns of a new pending payment.
#[derive(Debug, Clone)]
pub(crate) struct PaymentInsert<'a> {
    pub uuid: PaymentUuid,
    pub booking_uuid: BookingUuid,
    pub amount: u64,
    pub currency: &'a str,
    pub method: PaymentMethod,
    pub intent_ref: &'a str,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &PaymentInsert<'_>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid)
            .bind(payment.booking_uuid)
            .bind(amount_to_db(payment.amount, "amount")?)
            .bind(payment.currency)
            .bind(payment.method.as_str())
            .bind(payment.intent_ref)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_FOR_UPDATE_SQL)
            .bind(payment)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment_by_intent_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        intent_ref: &str,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_BY_INTENT_FOR_UPDATE_SQL)
            .bind(intent_ref)
            .fetch_one(&mut **tx)
            .await
    }

    /// Persist the status, transaction reference and metadata of `payment`.
    pub(crate) async fn update_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &PaymentRecord,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_SQL)
            .bind(payment.uuid)
            .bind(payment.status.as_str())
            .bind(payment.transaction_ref.as_deref())
            .bind(Json(&payment.metadata))
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let method: String = row.try_get("method")?;
        let status: String = row.try_get("status")?;
        let metadata: Json<PaymentMetadata> = row.try_get("metadata")?;

        Ok(Self {
            uuid: row.try_get("uuid")?,
            booking_uuid: row.try_get("booking_uuid")?,
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            method: method
                .parse()
                .map_err(|error| decode_error("method", error))?,
            intent_ref: row.try_get("intent_ref")?,
            status: status
                .parse()
                .map_err(|error| decode_error("status", error))?,
            transaction_ref: row.try_get("transaction_ref")?,
            metadata: metadata.0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
