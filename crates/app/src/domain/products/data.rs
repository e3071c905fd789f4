//! Products Data

use std::collections::BTreeMap;

use jiff::Timestamp;

use crate::domain::products::records::{ProductUuid, RentalUnits};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_rentable: bool,
    pub rental_units: RentalUnits,
    pub total_quantity: u64,
}

/// Product Update Data
///
/// `None` leaves a field untouched. Rental units are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub is_rentable: Option<bool>,
    pub is_active: Option<bool>,
    pub rental_units: Option<RentalUnits>,
    pub total_quantity: Option<u64>,
    pub available_quantity: Option<u64>,
}

/// Catalog listing filter. Only active products are ever listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,

    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

/// Availability of a product over a requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub available_quantity: u64,
    pub total_quantity: u64,
}

/// A requested rental window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateRange {
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }
}
