//! Payments
//!
//! A ledger of payment attempts against bookings. The ledger never touches a
//! booking's status or inventory, only its payment status.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;
