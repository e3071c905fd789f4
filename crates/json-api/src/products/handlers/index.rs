//! Product Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use rentals_app::domain::{pagination::PageRequest, products::data::ProductFilter};

use crate::{
    errors::ApiError,
    extensions::*,
    pagination::PaginationResponse,
    products::{errors::into_api_error, models::ProductResponse},
    state::State,
};

const DEFAULT_LIMIT: u32 = 12;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    pub success: bool,

    /// Active products, newest first
    pub products: Vec<ProductResponse>,

    pub pagination: PaginationResponse,
}

/// Product Index Handler
///
/// Lists active products, optionally narrowed by category or a search term
/// matched against name and description.
#[endpoint(tags("products"), summary = "List Products")]
pub(crate) async fn handler(
    category: QueryParam<String, false>,
    search: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let filter = ProductFilter {
        category: category.into_inner().filter(|value| !value.is_empty()),
        search: search.into_inner().filter(|value| !value.is_empty()),
    };

    let page_request = PageRequest::new(page.into_inner(), limit.into_inner(), DEFAULT_LIMIT);

    let products = state
        .products
        .list_products(filter, page_request)
        .await
        .map_err(into_api_error)?;

    Ok(Json(ProductsResponse {
        success: true,
        pagination: PaginationResponse::from(&products),
        products: products.items.into_iter().map(Into::into).collect(),
    }))
}
