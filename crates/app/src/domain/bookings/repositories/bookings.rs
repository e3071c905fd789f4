//! Bookings Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, decode_error, try_get_amount},
    domain::{
        bookings::records::{
            BookingDates, BookingItems, BookingPaymentStatus, BookingPricing, BookingRecord,
            BookingStatus, BookingUuid, DeliveryAddress,
        },
        pagination::PageRequest,
    },
};

const CREATE_BOOKING_SQL: &str = include_str!("../sql/create_booking.sql");
const GET_BOOKING_SQL: &str = include_str!("../sql/get_booking.sql");
const GET_BOOKING_FOR_UPDATE_SQL: &str = include_str!("../sql/get_booking_for_update.sql");
const LIST_BOOKINGS_SQL: &str = include_str!("../sql/list_bookings.sql");
const COUNT_BOOKINGS_SQL: &str = include_str!("../sql/count_bookings.sql");
const UPDATE_BOOKING_SQL: &str = include_str!("../sql/update_booking.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("../sql/update_payment_status.sql");

/// Columns of a booking insert that are not generated by the database.
#[derive(Debug, Clone)]
pub(crate) struct BookingInsert<'a> {
    pub uuid: BookingUuid,
    pub booking_number: &'a str,
    pub customer_uuid: Uuid,
    pub start: Timestamp,
    pub end: Timestamp,
    pub pricing: BookingPricing,
    pub delivery_address: Option<&'a DeliveryAddress>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBookingsRepository;

impl PgBookingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a booking. Returns `None` when the booking number is taken.
    pub(crate) async fn create_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: &BookingInsert<'_>,
    ) -> Result<Option<BookingRecord>, sqlx::Error> {
        let address = booking.delivery_address;

        query_as::<Postgres, BookingRecord>(CREATE_BOOKING_SQL)
            .bind(booking.uuid)
            .bind(booking.booking_number)
            .bind(booking.customer_uuid)
            .bind(SqlxTimestamp::from(booking.start))
            .bind(SqlxTimestamp::from(booking.end))
            .bind(amount_to_db(booking.pricing.subtotal, "subtotal")?)
            .bind(amount_to_db(booking.pricing.discount, "discount")?)
            .bind(amount_to_db(booking.pricing.late_fees, "late_fees")?)
            .bind(amount_to_db(booking.pricing.total, "total")?)
            .bind(address.and_then(|a| a.street.as_deref()))
            .bind(address.and_then(|a| a.city.as_deref()))
            .bind(address.and_then(|a| a.state.as_deref()))
            .bind(address.and_then(|a| a.zip_code.as_deref()))
            .bind(address.and_then(|a| a.country.as_deref()))
            .bind(booking.notes)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingRecord, sqlx::Error> {
        query_as::<Postgres, BookingRecord>(GET_BOOKING_SQL)
            .bind(booking)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a booking and lock its row until the transaction ends.
    pub(crate) async fn get_booking_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingRecord, sqlx::Error> {
        query_as::<Postgres, BookingRecord>(GET_BOOKING_FOR_UPDATE_SQL)
            .bind(booking)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: Option<Uuid>,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Result<Vec<BookingRecord>, sqlx::Error> {
        query_as::<Postgres, BookingRecord>(LIST_BOOKINGS_SQL)
            .bind(customer)
            .bind(status.map(BookingStatus::as_str))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: Option<Uuid>,
        status: Option<BookingStatus>,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_BOOKINGS_SQL)
            .bind(customer)
            .bind(status.map(BookingStatus::as_str))
            .fetch_one(&mut **tx)
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Persist the mutable lifecycle fields of `booking`.
    pub(crate) async fn update_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: &BookingRecord,
    ) -> Result<BookingRecord, sqlx::Error> {
        query_as::<Postgres, BookingRecord>(UPDATE_BOOKING_SQL)
            .bind(booking.uuid)
            .bind(booking.status.as_str())
            .bind(booking.notes.as_deref())
            .bind(booking.dates.actual_return.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        payment_status: BookingPaymentStatus,
        payment_intent_ref: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_PAYMENT_STATUS_SQL)
            .bind(booking)
            .bind(payment_status.as_str())
            .bind(payment_intent_ref)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for BookingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let payment_status: String = row.try_get("payment_status")?;

        let delivery_address = DeliveryAddress {
            street: row.try_get("delivery_street")?,
            city: row.try_get("delivery_city")?,
            state: row.try_get("delivery_state")?,
            zip_code: row.try_get("delivery_zip_code")?,
            country: row.try_get("delivery_country")?,
        };

        Ok(Self {
            uuid: row.try_get("uuid")?,
            booking_number: row.try_get("booking_number")?,
            customer_uuid: row.try_get("customer_uuid")?,
            items: BookingItems::new(),
            dates: BookingDates {
                start: row.try_get::<SqlxTimestamp, _>("start_date")?.to_jiff(),
                end: row.try_get::<SqlxTimestamp, _>("end_date")?.to_jiff(),
                actual_return: row
                    .try_get::<Option<SqlxTimestamp>, _>("actual_return_date")?
                    .map(SqlxTimestamp::to_jiff),
            },
            pricing: BookingPricing {
                subtotal: try_get_amount(row, "subtotal")?,
                discount: try_get_amount(row, "discount")?,
                late_fees: try_get_amount(row, "late_fees")?,
                total: try_get_amount(row, "total")?,
            },
            status: status
                .parse()
                .map_err(|error| decode_error("status", error))?,
            payment_status: payment_status
                .parse()
                .map_err(|error| decode_error("payment_status", error))?,
            payment_intent_ref: row.try_get("payment_intent_ref")?,
            delivery_address: (!delivery_address.is_empty()).then_some(delivery_address),
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
