//! Booking Items Repository

use rustc_hash::FxHashMap;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, decode_error, try_get_amount},
    domain::bookings::records::{BookingItem, BookingItems, BookingRecord, BookingUuid},
};

const CREATE_BOOKING_ITEM_SQL: &str = include_str!("../sql/create_booking_item.sql");
const GET_BOOKING_ITEMS_SQL: &str = include_str!("../sql/get_booking_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBookingItemsRepository;

impl PgBookingItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_booking_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        items: &[BookingItem],
    ) -> Result<(), sqlx::Error> {
        for (position, item) in items.iter().enumerate() {
            query(CREATE_BOOKING_ITEM_SQL)
                .bind(booking)
                .bind(i32::try_from(position).map_err(|error| decode_error("position", error))?)
                .bind(item.product_uuid)
                .bind(amount_to_db(item.quantity, "quantity")?)
                .bind(amount_to_db(item.unit_price, "unit_price")?)
                .bind(item.rental_unit.as_str())
                .bind(i32::try_from(item.duration).map_err(|error| decode_error("duration", error))?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Load the line items of every booking in `bookings`, in position order.
    pub(crate) async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bookings: &mut [BookingRecord],
    ) -> Result<(), sqlx::Error> {
        if bookings.is_empty() {
            return Ok(());
        }

        let uuids: Vec<Uuid> = bookings.iter().map(|b| b.uuid.into_uuid()).collect();

        let rows = query(GET_BOOKING_ITEMS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut grouped: FxHashMap<Uuid, BookingItems> = FxHashMap::default();

        for row in &rows {
            let booking_uuid: Uuid = row.try_get("booking_uuid")?;

            grouped
                .entry(booking_uuid)
                .or_default()
                .push(booking_item_from_row(row)?);
        }

        for booking in bookings {
            if let Some(items) = grouped.remove(&booking.uuid.into_uuid()) {
                booking.items = items;
            }
        }

        Ok(())
    }
}

fn booking_item_from_row(row: &PgRow) -> Result<BookingItem, sqlx::Error> {
    let rental_unit: String = row.try_get("rental_unit")?;
    let duration: i32 = row.try_get("duration")?;

    Ok(BookingItem {
        product_uuid: row.try_get("product_uuid")?,
        quantity: try_get_amount(row, "quantity")?,
        unit_price: try_get_amount(row, "unit_price")?,
        rental_unit: rental_unit
            .parse()
            .map_err(|error| decode_error("rental_unit", error))?,
        duration: u32::try_from(duration).map_err(|error| decode_error("duration", error))?,
    })
}
