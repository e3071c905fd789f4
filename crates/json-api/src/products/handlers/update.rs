//! Update Product Handler

use std::{collections::BTreeMap, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::products::data::ProductUpdate;

use crate::{
    errors::ApiError,
    extensions::*,
    products::{
        errors::into_api_error,
        models::{ProductEnvelope, RentalUnitBody, into_rental_units},
    },
    state::State,
};

/// Inventory Patch
///
/// Reserved quantity is owned by bookings and cannot be set here.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct InventoryPatch {
    pub total_quantity: Option<u64>,
    pub available_quantity: Option<u64>,
}

/// Update Product Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub is_rentable: Option<bool>,
    pub is_active: Option<bool>,

    /// Replaces every existing tier
    pub rental_units: Option<Vec<RentalUnitBody>>,

    pub inventory: Option<InventoryPatch>,
}

impl UpdateProductRequest {
    fn into_update(self) -> Result<ProductUpdate, ApiError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
        ] {
            if value.as_deref().is_some_and(|value| value.trim().is_empty()) {
                return Err(ApiError::validation(format!("{field} must not be empty")));
            }
        }

        let inventory = self.inventory.unwrap_or_default();

        Ok(ProductUpdate {
            name: self.name.map(|name| name.trim().to_owned()),
            description: self.description.map(|value| value.trim().to_owned()),
            category: self.category.map(|value| value.trim().to_owned()),
            images: self.images,
            specifications: self.specifications,
            is_rentable: self.is_rentable,
            is_active: self.is_active,
            rental_units: self.rental_units.map(into_rental_units).transpose()?,
            total_quantity: inventory.total_quantity,
            available_quantity: inventory.available_quantity,
        })
    }
}

/// Product Update Handler
///
/// Admin only. Absent fields are left untouched.
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = product.into_inner();
    let update = json.into_inner().into_update()?;

    tracing::Span::current().record("product_uuid", tracing::field::display(product));

    let updated = state
        .products
        .update_product(product.into(), update)
        .await
        .map_err(into_api_error)?;

    tracing::info!(
        product_uuid = %product,
        total = updated.inventory.total,
        available = updated.inventory.available,
        "updated product"
    );

    Ok(Json(ProductEnvelope::new(updated)))
}
