//! Booking Index Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use rentals_app::domain::{
    bookings::{data::BookingFilter, records::BookingStatus},
    pagination::PageRequest,
};

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    errors::ApiError,
    extensions::*,
    pagination::PaginationResponse,
    state::State,
};

const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingsResponse {
    pub success: bool,

    /// Newest first
    pub bookings: Vec<BookingResponse>,

    pub pagination: PaginationResponse,
}

/// Booking Index Handler
///
/// Customers see their own bookings, admins see everyone's.
#[endpoint(
    tags("bookings"),
    summary = "List Bookings",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<BookingsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let status = status
        .into_inner()
        .filter(|value| !value.is_empty())
        .map(|value| value.parse::<BookingStatus>())
        .transpose()
        .map_err(|error| ApiError::validation(error.to_string()))?;

    let page_request = PageRequest::new(page.into_inner(), limit.into_inner(), DEFAULT_LIMIT);

    let bookings = state
        .bookings
        .list_bookings(&principal, BookingFilter { status }, page_request)
        .await
        .map_err(into_api_error)?;

    let now = Timestamp::now();

    Ok(Json(BookingsResponse {
        success: true,
        pagination: PaginationResponse::from(&bookings),
        bookings: bookings
            .items
            .into_iter()
            .map(|booking| BookingResponse::new(booking, now))
            .collect(),
    }))
}
