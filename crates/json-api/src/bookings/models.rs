//! Booking request and response bodies.

use jiff::Timestamp;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::bookings::records::{
    BookingItem, BookingPricing, BookingRecord, DeliveryAddress,
};

use crate::{errors::ApiError, products::models::parse_rental_unit};

/// Booking line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingItemBody {
    /// Product ID
    pub product: Uuid,

    pub quantity: u64,

    /// Price per rental unit in minor currency units
    pub unit_price: u64,

    /// `hour`, `day`, `week`, `month` or `year`
    pub rental_unit: String,

    /// Number of rental units
    pub duration: u32,
}

impl BookingItemBody {
    pub(crate) fn into_item(self) -> Result<BookingItem, ApiError> {
        Ok(BookingItem {
            product_uuid: self.product.into(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            rental_unit: parse_rental_unit(&self.rental_unit)?,
            duration: self.duration,
        })
    }
}

impl From<&BookingItem> for BookingItemBody {
    fn from(item: &BookingItem) -> Self {
        Self {
            product: item.product_uuid.into_uuid(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            rental_unit: item.rental_unit.to_string(),
            duration: item.duration,
        }
    }
}

/// Delivery address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryAddressBody {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl From<DeliveryAddressBody> for DeliveryAddress {
    fn from(address: DeliveryAddressBody) -> Self {
        Self {
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
        }
    }
}

impl From<DeliveryAddress> for DeliveryAddressBody {
    fn from(address: DeliveryAddress) -> Self {
        Self {
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingDatesResponse {
    pub start_date: String,
    pub end_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_return_date: Option<String>,
}

/// Server-computed pricing, in minor currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingPricingResponse {
    pub subtotal: u64,
    pub discount: u64,
    pub late_fees: u64,
    pub total: u64,
}

impl From<BookingPricing> for BookingPricingResponse {
    fn from(pricing: BookingPricing) -> Self {
        Self {
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            late_fees: pricing.late_fees,
            total: pricing.total,
        }
    }
}

/// Booking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingResponse {
    pub id: Uuid,

    /// Human-readable reference, e.g. `BK-20260308-7QK2M9XA`
    pub booking_number: String,

    pub customer_id: Uuid,
    pub items: Vec<BookingItemBody>,
    pub dates: BookingDatesResponse,
    pub pricing: BookingPricingResponse,

    /// `pending`, `confirmed`, `active`, `completed` or `cancelled`
    pub status: String,

    /// `pending`, `paid`, `refunded` or `failed`
    pub payment_status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddressBody>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Rental window in whole days, rounded up
    pub duration_in_days: i64,

    /// Returned, or still out, after the end date
    pub is_late: bool,

    pub created_at: String,
    pub updated_at: String,
}

impl BookingResponse {
    pub(crate) fn new(booking: BookingRecord, now: Timestamp) -> Self {
        Self {
            id: booking.uuid.into_uuid(),
            duration_in_days: booking.duration_in_days(),
            is_late: booking.is_late(now),
            items: booking.items.iter().map(Into::into).collect(),
            dates: BookingDatesResponse {
                start_date: booking.dates.start.to_string(),
                end_date: booking.dates.end.to_string(),
                actual_return_date: booking.dates.actual_return.map(|at| at.to_string()),
            },
            pricing: booking.pricing.into(),
            status: booking.status.as_str().to_owned(),
            payment_status: booking.payment_status.as_str().to_owned(),
            created_at: booking.created_at.to_string(),
            updated_at: booking.updated_at.to_string(),
            booking_number: booking.booking_number,
            customer_id: booking.customer_uuid,
            payment_intent_id: booking.payment_intent_ref,
            delivery_address: booking.delivery_address.map(Into::into),
            notes: booking.notes,
        }
    }
}

/// Single booking envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingEnvelope {
    pub success: bool,
    pub booking: BookingResponse,
}

impl BookingEnvelope {
    pub(crate) fn new(booking: BookingRecord) -> Self {
        Self {
            success: true,
            booking: BookingResponse::new(booking, Timestamp::now()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use jiff::SignedDuration;
    use smallvec::smallvec;
    use uuid::Uuid;

    use rentals_app::domain::{
        bookings::records::{
            BookingDates, BookingItem, BookingPaymentStatus, BookingPricing, BookingRecord,
            BookingStatus, BookingUuid,
        },
        products::records::{ProductUuid, RentalUnit},
    };

    use crate::test_helpers::timestamp;

    /// Two cargo bikes for three days, starting a week after [`timestamp`].
    pub(crate) fn make_booking(
        uuid: BookingUuid,
        customer: Uuid,
        status: BookingStatus,
    ) -> BookingRecord {
        let start = timestamp() + SignedDuration::from_hours(24 * 7);

        BookingRecord {
            uuid,
            booking_number: "BK-20260308-7QK2M9XA".to_string(),
            customer_uuid: customer,
            items: smallvec![BookingItem {
                product_uuid: ProductUuid::from(Uuid::from_u128(0xb1)),
                quantity: 2,
                unit_price: 2_500,
                rental_unit: RentalUnit::Day,
                duration: 3,
            }],
            dates: BookingDates {
                start,
                end: start + SignedDuration::from_hours(24 * 3),
                actual_return: None,
            },
            pricing: BookingPricing {
                subtotal: 15_000,
                discount: 0,
                late_fees: 0,
                total: 15_000,
            },
            status,
            payment_status: BookingPaymentStatus::Pending,
            payment_intent_ref: None,
            delivery_address: None,
            notes: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }
}
