//! Update Booking Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::bookings::{data::BookingUpdate, records::BookingStatus};

use crate::{
    bookings::{errors::into_api_error, models::BookingEnvelope},
    dates::parse_timestamp,
    errors::ApiError,
    extensions::*,
    observability::record_booking_transition,
    state::State,
};

/// Update Booking Request
///
/// Only these fields can be changed. Anything else is rejected.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateBookingRequest {
    /// Target status, subject to the usual transition rules
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[serde(default)]
    pub actual_return_date: Option<String>,
}

impl UpdateBookingRequest {
    fn into_update(self) -> Result<BookingUpdate, ApiError> {
        let status = self
            .status
            .map(|status| status.parse::<BookingStatus>())
            .transpose()
            .map_err(|error| ApiError::validation(error.to_string()))?;

        let actual_return_date = self
            .actual_return_date
            .map(|value| parse_timestamp(&value))
            .transpose()
            .map_err(|error| {
                ApiError::validation(format!("actualReturnDate must be a valid date: {error}"))
            })?;

        let update = BookingUpdate {
            status,
            notes: self.notes,
            actual_return_date,
        };

        if update.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }

        Ok(update)
    }
}

/// Update Booking Handler
///
/// Changes the notes, the actual return date or the status of a booking.
#[endpoint(
    tags("bookings"),
    summary = "Update Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "bookings.update",
    skip(booking, json, depot),
    fields(booking_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<UpdateBookingRequest>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let booking = booking.into_inner();

    tracing::Span::current().record("booking_uuid", tracing::field::display(booking));

    let update = json.into_inner().into_update()?;
    let status = update.status;

    let booking = state
        .bookings
        .update_booking(&principal, booking.into(), update)
        .await
        .map_err(into_api_error)?;

    if let Some(status) = status {
        record_booking_transition("update", status.as_str());
    }

    Ok(Json(BookingEnvelope::new(booking)))
}
