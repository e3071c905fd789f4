//! Products
//!
//! The rentable catalog and its inventory counters. Reservation and release
//! are exposed to the bookings service through the crate-private repository.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use service::*;
