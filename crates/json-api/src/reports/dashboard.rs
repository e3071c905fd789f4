//! Dashboard Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use rentals_app::domain::reports::{
    ReportsServiceError,
    records::{DashboardStats, ReportRange},
};

use crate::{dates::parse_timestamp, errors::ApiError, extensions::*, state::State};

/// Dashboard figures. Money is in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardStatsBody {
    /// Active products
    pub total_products: u64,

    /// Distinct customers with a booking in the range
    pub total_users: u64,

    pub total_bookings: u64,
    pub active_rentals: u64,
    pub total_revenue: u64,
    pub average_booking_value: u64,
}

impl From<DashboardStats> for DashboardStatsBody {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_products: stats.total_products,
            total_users: stats.total_customers,
            total_bookings: stats.total_bookings,
            active_rentals: stats.active_rentals,
            total_revenue: stats.total_revenue,
            average_booking_value: stats.average_booking_value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DashboardResponse {
    pub success: bool,
    pub stats: DashboardStatsBody,
}

fn into_api_error(error: ReportsServiceError) -> ApiError {
    match error {
        ReportsServiceError::InvalidDateRange => {
            ApiError::bad_request("INVALID_DATES", "Start date must not be after end date")
        }
        ReportsServiceError::Sql(source) => ApiError::internal("report storage error", source),
    }
}

fn report_range(req: &Request) -> Result<ReportRange, ApiError> {
    let parse = |key: &str| {
        req.query::<String>(key)
            .filter(|value| !value.is_empty())
            .map(|value| parse_timestamp(&value))
            .transpose()
            .map_err(|_error| {
                ApiError::bad_request("INVALID_DATES", format!("{key} must be ISO 8601"))
            })
    };

    Ok(ReportRange {
        start: parse("startDate")?,
        end: parse("endDate")?,
    })
}

/// Dashboard Handler
///
/// Admin only. `startDate` and `endDate` restrict the booking figures to
/// bookings created in that window.
#[endpoint(
    tags("reports"),
    summary = "Dashboard Statistics",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<DashboardResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let range = report_range(req)?;

    let stats = state
        .reports
        .dashboard(range)
        .await
        .map_err(into_api_error)?;

    Ok(Json(DashboardResponse {
        success: true,
        stats: stats.into(),
    }))
}
