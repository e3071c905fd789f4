//! Product Records

use std::{collections::BTreeMap, fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    database::{MAX_AMOUNT, MAX_DURATION},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Most products offer a handful of tiers at most.
pub type RentalUnits = SmallVec<[RentalUnitPrice; 4]>;

/// Time unit a product is rented by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RentalUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for RentalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown rental unit `{0}`")]
pub struct UnknownRentalUnit(String);

impl FromStr for RentalUnit {
    type Err = UnknownRentalUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(UnknownRentalUnit(other.to_string())),
        }
    }
}

/// One price tier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalUnitPrice {
    pub unit: RentalUnit,

    /// Price per unit, in minor currency units.
    pub price: u64,

    pub min_duration: u32,
    pub max_duration: Option<u32>,
}

impl RentalUnitPrice {
    /// Whether a rental of `duration` units fits this tier.
    #[must_use]
    pub fn accepts(&self, duration: u32) -> bool {
        duration >= self.min_duration.max(1)
            && duration <= self.max_duration.unwrap_or(MAX_DURATION).min(MAX_DURATION)
    }

    /// Whether the tier itself is well formed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price <= MAX_AMOUNT
            && (1..=MAX_DURATION).contains(&self.min_duration)
            && self
                .max_duration
                .is_none_or(|max| (self.min_duration..=MAX_DURATION).contains(&max))
    }
}

/// Inventory counters.
///
/// `available + reserved` never exceeds `total`, and `total` fits a `BIGINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inventory {
    pub total: u64,
    pub available: u64,
    pub reserved: u64,
}

impl Inventory {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total <= MAX_AMOUNT
            && self
                .available
                .checked_add(self.reserved)
                .is_some_and(|sum| sum <= self.total)
    }
}

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_rentable: bool,
    pub is_active: bool,
    pub rental_units: RentalUnits,
    pub inventory: Inventory,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// The tier for `unit`, if the product offers one.
    #[must_use]
    pub fn rental_unit(&self, unit: RentalUnit) -> Option<&RentalUnitPrice> {
        self.rental_units.iter().find(|tier| tier.unit == unit)
    }

    /// Approximate availability: any unit not yet reserved.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_active && self.inventory.available > 0
    }
}
