//! Bookings Data

use jiff::Timestamp;

use crate::domain::{
    bookings::records::{BookingItem, BookingStatus, DeliveryAddress},
    products::data::DateRange,
};

/// New Booking Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub items: Vec<BookingItem>,
    pub dates: DateRange,

    /// Total the client expects to pay. Checked against the server's quote.
    pub quoted_total: Option<u64>,

    pub delivery_address: Option<DeliveryAddress>,
    pub notes: Option<String>,
}

/// Booking Update Data
///
/// The only fields a generic update may touch. A status goes through the
/// same transition rules as the dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
    pub actual_return_date: Option<Timestamp>,
}

impl BookingUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none() && self.actual_return_date.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
}
