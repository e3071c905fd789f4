//! Create Product Handler

use std::{collections::BTreeMap, sync::Arc};

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use rentals_app::domain::products::{data::NewProduct, records::ProductUuid};

use crate::{
    errors::ApiError,
    extensions::*,
    products::{
        errors::into_api_error,
        models::{ProductEnvelope, RentalUnitBody, into_rental_units},
    },
    state::State,
};

/// Initial stock
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewInventoryBody {
    pub total_quantity: u64,
}

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub specifications: BTreeMap<String, String>,

    #[serde(default = "rentable_by_default")]
    pub is_rentable: bool,

    pub rental_units: Vec<RentalUnitBody>,
    pub inventory: NewInventoryBody,
}

fn rentable_by_default() -> bool {
    true
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, ApiError> {
        let mut invalid = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                invalid.push(json!({ "field": field, "message": "must not be empty" }));
            }
        }

        if self.rental_units.is_empty() {
            invalid.push(json!({ "field": "rentalUnits", "message": "at least one is required" }));
        }

        if self.inventory.total_quantity == 0 {
            invalid.push(json!({
                "field": "inventory.totalQuantity",
                "message": "must be at least 1",
            }));
        }

        if !invalid.is_empty() {
            return Err(ApiError::validation("Invalid input data").with_details(invalid.into()));
        }

        Ok(NewProduct {
            uuid: ProductUuid::new(),
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            category: self.category.trim().to_owned(),
            images: self.images,
            specifications: self.specifications,
            is_rentable: self.is_rentable,
            rental_units: into_rental_units(self.rental_units)?,
            total_quantity: self.inventory.total_quantity,
        })
    }
}

/// Create Product Handler
///
/// Admin only. Every unit starts out available.
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let new_product = json.into_inner().into_new_product()?;

    tracing::Span::current().record("product_uuid", tracing::field::display(new_product.uuid));

    let product = state
        .products
        .create_product(new_product)
        .await
        .map_err(into_api_error)?;

    res.add_header(LOCATION, format!("/api/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(ProductEnvelope::new(product)))
}
