//! Create Booking Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use rentals_app::domain::{bookings::data::NewBooking, products::data::DateRange};

use crate::{
    bookings::{
        errors::into_api_error,
        models::{BookingEnvelope, BookingItemBody, DeliveryAddressBody},
    },
    dates::parse_timestamp,
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Requested rental window
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingDatesBody {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: String,

    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub end_date: String,
}

/// Client-side quote
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteBody {
    /// Expected total in minor currency units
    pub total: u64,
}

/// Create Booking Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBookingRequest {
    pub items: Vec<BookingItemBody>,
    pub dates: BookingDatesBody,

    /// Rejected when it differs from the server-computed total
    #[serde(default)]
    pub pricing: Option<QuoteBody>,

    #[serde(default)]
    pub delivery_address: Option<DeliveryAddressBody>,

    #[serde(default)]
    pub notes: Option<String>,
}

fn invalid_field(field: impl Into<String>, message: &str) -> Value {
    json!({ "field": field.into(), "message": message })
}

impl CreateBookingRequest {
    fn into_new_booking(self) -> Result<NewBooking, ApiError> {
        let mut invalid = Vec::new();

        if self.items.is_empty() {
            invalid.push(invalid_field("items", "at least one item is required"));
        }

        for (index, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                invalid.push(invalid_field(format!("items[{index}].quantity"), "must be at least 1"));
            }

            if item.duration == 0 {
                invalid.push(invalid_field(format!("items[{index}].duration"), "must be at least 1"));
            }
        }

        let start = parse_timestamp(&self.dates.start_date);
        let end = parse_timestamp(&self.dates.end_date);

        if start.is_err() {
            invalid.push(invalid_field("dates.startDate", "must be a valid date"));
        }

        if end.is_err() {
            invalid.push(invalid_field("dates.endDate", "must be a valid date"));
        }

        let (Ok(start), Ok(end)) = (start, end) else {
            return Err(ApiError::validation("Invalid input data").with_details(invalid.into()));
        };

        if !invalid.is_empty() {
            return Err(ApiError::validation("Invalid input data").with_details(invalid.into()));
        }

        let items = self
            .items
            .into_iter()
            .map(BookingItemBody::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewBooking {
            items,
            dates: DateRange { start, end },
            quoted_total: self.pricing.map(|quote| quote.total),
            delivery_address: self.delivery_address.map(Into::into),
            notes: self.notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}

/// Create Booking Handler
///
/// Prices the items on the server and reserves inventory for every line.
/// The booking starts out `pending`.
#[endpoint(
    tags("bookings"),
    summary = "Create Booking",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Booking created"),
    ),
)]
#[tracing::instrument(
    name = "bookings.create",
    skip(json, depot, res),
    fields(customer_uuid = tracing::field::Empty, booking_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateBookingRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<BookingEnvelope>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let new_booking = json.into_inner().into_new_booking()?;

    tracing::Span::current().record("customer_uuid", tracing::field::display(principal.uuid));

    let booking = state
        .bookings
        .create_booking(&principal, new_booking)
        .await
        .map_err(into_api_error)?;

    tracing::Span::current().record("booking_uuid", tracing::field::display(booking.uuid));

    res.add_header(LOCATION, format!("/api/bookings/{}", booking.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(BookingEnvelope::new(booking)))
}
