//! Rental Domain Concerns

pub mod bookings;
pub mod pagination;
pub mod payments;
pub mod products;
pub mod reports;
