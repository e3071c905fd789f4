//! Booking Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::products::records::{ProductUuid, RentalUnit},
    uuids::TypedUuid,
};

/// Booking UUID
pub type BookingUuid = TypedUuid<BookingRecord>;

/// Line items of a booking.
pub type BookingItems = SmallVec<[BookingItem; 4]>;

const SECONDS_PER_DAY: i64 = 86_400;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Payment axis of a booking, driven by the payment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingPaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl BookingPaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for BookingPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingPaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingItem {
    pub product_uuid: ProductUuid,
    pub quantity: u64,
    pub unit_price: u64,
    pub rental_unit: RentalUnit,
    pub duration: u32,
}

impl BookingItem {
    /// `unit_price * quantity * duration`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price
            .checked_mul(self.quantity)?
            .checked_mul(u64::from(self.duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingDates {
    pub start: Timestamp,
    pub end: Timestamp,
    pub actual_return: Option<Timestamp>,
}

/// Amounts are in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingPricing {
    pub subtotal: u64,
    pub discount: u64,
    pub late_fees: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl DeliveryAddress {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.country.is_none()
    }
}

/// Booking Record
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub uuid: BookingUuid,
    pub booking_number: String,
    pub customer_uuid: Uuid,
    pub items: BookingItems,
    pub dates: BookingDates,
    pub pricing: BookingPricing,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub payment_intent_ref: Option<String>,
    pub delivery_address: Option<DeliveryAddress>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookingRecord {
    /// Length of the rental window in whole days, rounded up.
    #[must_use]
    pub fn duration_in_days(&self) -> i64 {
        let seconds = self
            .dates
            .end
            .duration_since(self.dates.start)
            .abs()
            .as_secs();

        seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) > 0)
    }

    /// Whether the rental was, or currently is, returned after its end date.
    #[must_use]
    pub fn is_late(&self, now: Timestamp) -> bool {
        match self.dates.actual_return {
            Some(returned) => returned > self.dates.end,
            None => self.status == BookingStatus::Active && now > self.dates.end,
        }
    }
}
