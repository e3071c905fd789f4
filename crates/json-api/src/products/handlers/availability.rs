//! Product Availability Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentals_app::domain::products::data::{Availability, DateRange};

use crate::{
    dates::parse_timestamp, errors::ApiError, extensions::*, products::errors::into_api_error,
    state::State,
};

/// Availability Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvailabilityResponse {
    pub success: bool,
    pub available: bool,
    pub available_quantity: u64,
    pub total_quantity: u64,
}

impl From<Availability> for AvailabilityResponse {
    fn from(availability: Availability) -> Self {
        Self {
            success: true,
            available: availability.available,
            available_quantity: availability.available_quantity,
            total_quantity: availability.total_quantity,
        }
    }
}

fn requested_range(req: &Request) -> Result<DateRange, ApiError> {
    let (Some(start), Some(end)) = (
        req.query::<String>("startDate"),
        req.query::<String>("endDate"),
    ) else {
        return Err(ApiError::bad_request(
            "MISSING_DATES",
            "Start date and end date are required",
        ));
    };

    let invalid = |_error| ApiError::bad_request("INVALID_DATES", "Dates must be ISO 8601");

    Ok(DateRange {
        start: parse_timestamp(&start).map_err(invalid)?,
        end: parse_timestamp(&end).map_err(invalid)?,
    })
}

/// Product Availability Handler
///
/// Requires `startDate` and `endDate` query parameters. Availability is read
/// from the product's inventory counters.
#[endpoint(tags("products"), summary = "Check Product Availability")]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let range = requested_range(req)?;

    let availability = state
        .products
        .check_availability(product.into_inner().into(), range)
        .await
        .map_err(into_api_error)?;

    Ok(Json(availability.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use rentals_app::domain::products::ProductsServiceError;

    use crate::{
        errors::ErrorResponse,
        test_helpers::{Mocks, make_service},
    };

    use super::*;

    fn make_products_service(mocks: Mocks) -> Service {
        make_service(
            mocks,
            None,
            Router::with_path("products/{product}/availability").get(handler),
        )
    }

    fn url(query: &str) -> String {
        format!(
            "http://example.com/products/{}/availability{query}",
            Uuid::now_v7()
        )
    }

    #[tokio::test]
    async fn test_availability_reports_counters() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_check_availability()
            .once()
            .withf(|_, range| range.is_ordered())
            .return_once(|_, _| {
                Ok(Availability {
                    available: true,
                    available_quantity: 3,
                    total_quantity: 5,
                })
            });

        let response: AvailabilityResponse =
            TestClient::get(url("?startDate=2026-03-01&endDate=2026-03-03"))
                .send(&make_products_service(mocks))
                .await
                .take_json()
                .await?;

        assert!(response.available, "expected the product to be available");
        assert_eq!(response.available_quantity, 3);
        assert_eq!(response.total_quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_dates_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.products.expect_check_availability().never();

        let mut res = TestClient::get(url("?startDate=2026-03-01"))
            .send(&make_products_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.error.code, "MISSING_DATES");

        Ok(())
    }

    #[tokio::test]
    async fn test_inverted_dates_return_invalid_dates() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_check_availability()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::InvalidDateRange));

        let mut res = TestClient::get(url("?startDate=2026-03-03&endDate=2026-03-01"))
            .send(&make_products_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.error.code, "INVALID_DATES");

        Ok(())
    }

    #[tokio::test]
    async fn test_unparseable_dates_return_invalid_dates() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.products.expect_check_availability().never();

        let mut res = TestClient::get(url("?startDate=soon&endDate=later"))
            .send(&make_products_service(mocks))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.error.code, "INVALID_DATES");

        Ok(())
    }
}
