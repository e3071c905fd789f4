//! Bookings
//!
//! Creating a booking reserves inventory for every line item in one
//! transaction. Status changes go through [`status::transition`], which
//! decides when that inventory is released again.

pub mod data;
pub mod errors;
pub mod number;
pub mod pricing;
pub mod records;
pub(crate) mod repositories;
pub mod service;
pub mod status;

pub use errors::BookingsServiceError;
pub use service::*;
