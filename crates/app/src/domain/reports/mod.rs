//! Reports
//!
//! Read-only aggregates over the catalog and bookings.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ReportsServiceError;
pub use service::*;
