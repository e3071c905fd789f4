//! Get Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    extensions::*,
    products::{errors::into_api_error, models::ProductEnvelope},
    state::State,
};

/// Get Product Handler
///
/// Returns an active product. Deactivated products are not found.
#[endpoint(tags("products"), summary = "Get Product")]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .products
        .get_product(product.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(Json(ProductEnvelope::new(product)))
}
