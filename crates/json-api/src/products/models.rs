//! Product request and response bodies.

use std::collections::BTreeMap;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::products::records::{
    Inventory, ProductRecord, RentalUnit, RentalUnitPrice, RentalUnits,
};

use crate::errors::ApiError;

/// One price tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RentalUnitBody {
    /// `hour`, `day`, `week`, `month` or `year`
    pub unit: String,

    /// Price per unit in minor currency units
    pub price: u64,

    #[serde(default = "default_min_duration")]
    pub min_duration: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
}

fn default_min_duration() -> u32 {
    1
}

impl From<&RentalUnitPrice> for RentalUnitBody {
    fn from(tier: &RentalUnitPrice) -> Self {
        Self {
            unit: tier.unit.to_string(),
            price: tier.price,
            min_duration: tier.min_duration,
            max_duration: tier.max_duration,
        }
    }
}

pub(crate) fn parse_rental_unit(unit: &str) -> Result<RentalUnit, ApiError> {
    unit.parse::<RentalUnit>()
        .map_err(|error| ApiError::validation(error.to_string()))
}

/// Convert request tiers, rejecting unknown unit names.
pub(crate) fn into_rental_units(tiers: Vec<RentalUnitBody>) -> Result<RentalUnits, ApiError> {
    tiers
        .into_iter()
        .map(|tier| {
            Ok(RentalUnitPrice {
                unit: parse_rental_unit(&tier.unit)?,
                price: tier.price,
                min_duration: tier.min_duration,
                max_duration: tier.max_duration,
            })
        })
        .collect()
}

/// Inventory counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryResponse {
    pub total_quantity: u64,
    pub available_quantity: u64,
    pub reserved_quantity: u64,
}

impl From<Inventory> for InventoryResponse {
    fn from(inventory: Inventory) -> Self {
        Self {
            total_quantity: inventory.total,
            available_quantity: inventory.available,
            reserved_quantity: inventory.reserved,
        }
    }
}

/// Product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_rentable: bool,
    pub is_active: bool,
    pub rental_units: Vec<RentalUnitBody>,
    pub inventory: InventoryResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        Self {
            id: product.uuid.into_uuid(),
            rental_units: product.rental_units.iter().map(Into::into).collect(),
            inventory: product.inventory.into(),
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
            name: product.name,
            description: product.description,
            category: product.category,
            images: product.images,
            specifications: product.specifications,
            is_rentable: product.is_rentable,
            is_active: product.is_active,
        }
    }
}

/// Single product envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductEnvelope {
    pub success: bool,
    pub product: ProductResponse,
}

impl ProductEnvelope {
    pub(crate) fn new(product: ProductRecord) -> Self {
        Self {
            success: true,
            product: product.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use smallvec::smallvec;

    use rentals_app::domain::products::records::{ProductUuid, RentalUnit};

    use crate::test_helpers::timestamp;

    use super::*;

    pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
        ProductRecord {
            uuid,
            name: "Cargo Bike".to_string(),
            description: "Electric cargo bike".to_string(),
            category: "bikes".to_string(),
            images: vec![],
            specifications: BTreeMap::new(),
            is_rentable: true,
            is_active: true,
            rental_units: smallvec![RentalUnitPrice {
                unit: RentalUnit::Day,
                price: 2_500,
                min_duration: 1,
                max_duration: None,
            }],
            inventory: Inventory {
                total: 5,
                available: 5,
                reserved: 0,
            },
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }
}
