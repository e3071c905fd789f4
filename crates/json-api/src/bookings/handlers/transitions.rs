//! Booking Status Transitions
//!
//! `confirm` and `cancel` are open to the booking's customer, `activate`
//! and `complete` are routed behind the admin check.

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use rentals_app::domain::bookings::records::BookingUuid;

use crate::{
    bookings::{errors::into_api_error, models::BookingEnvelope},
    errors::ApiError,
    extensions::*,
    observability::record_booking_transition,
    state::State,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Confirm,
    Cancel,
    Activate,
    Complete,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Activate => "activate",
            Self::Complete => "complete",
        }
    }
}

async fn apply(
    operation: Operation,
    booking: Uuid,
    depot: &Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let booking = BookingUuid::from(booking);

    let bookings = &state.bookings;

    let result = match operation {
        Operation::Confirm => bookings.confirm_booking(&principal, booking).await,
        Operation::Cancel => bookings.cancel_booking(&principal, booking).await,
        Operation::Activate => bookings.activate_booking(&principal, booking).await,
        Operation::Complete => bookings.complete_booking(&principal, booking).await,
    };

    let booking = result.map_err(into_api_error)?;

    record_booking_transition(operation.as_str(), booking.status.as_str());

    Ok(Json(BookingEnvelope::new(booking)))
}

/// Confirm Booking
///
/// `pending -> confirmed`.
#[endpoint(
    tags("bookings"),
    summary = "Confirm Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.confirm", skip(booking, depot), err)]
pub(crate) async fn confirm(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    apply(Operation::Confirm, booking.into_inner(), depot).await
}

/// Cancel Booking
///
/// Cancels a pending, confirmed or active booking and releases its inventory.
#[endpoint(
    tags("bookings"),
    summary = "Cancel Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.cancel", skip(booking, depot), err)]
pub(crate) async fn cancel(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    apply(Operation::Cancel, booking.into_inner(), depot).await
}

/// Activate Booking
///
/// `confirmed -> active`, when the items are handed over. Admin only.
#[endpoint(
    tags("bookings"),
    summary = "Activate Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.activate", skip(booking, depot), err)]
pub(crate) async fn activate(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    apply(Operation::Activate, booking.into_inner(), depot).await
}

/// Complete Booking
///
/// `active -> completed`, when the items come back. Records the return and
/// releases the inventory. Admin only.
#[endpoint(
    tags("bookings"),
    summary = "Complete Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.complete", skip(booking, depot), err)]
pub(crate) async fn complete(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookingEnvelope>, ApiError> {
    apply(Operation::Complete, booking.into_inner(), depot).await
}
