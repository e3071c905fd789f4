//! Booking Repositories

mod bookings;
mod items;

pub(crate) use bookings::{BookingInsert, PgBookingsRepository};
pub(crate) use items::PgBookingItemsRepository;
