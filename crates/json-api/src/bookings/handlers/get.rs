//! Get Booking Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    bookings::{errors::into_api_error, models::BookingEnvelope},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Get Booking Handler
#[endpoint(
    tags("bookings"),
    summary = "Get Booking",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let booking = state
        .bookings
        .get_booking(&principal, booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(Json(BookingEnvelope::new(booking)))
}
