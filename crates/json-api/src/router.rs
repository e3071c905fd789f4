//! App Router
//!
//! Everything lives under `/api`. Catalog reads are public, the rest needs a
//! bearer credential, and catalog writes, hand-over, return, refunds and
//! reports also need the admin role.

use salvo::Router;

use crate::{
    auth::middleware::{authenticate, require_admin},
    bookings, payments, products, reports,
};

pub(crate) fn app_router() -> Router {
    Router::with_path("api")
        .push(public_routes())
        .push(
            Router::new()
                .hoop(authenticate)
                .push(customer_routes())
                .push(Router::new().hoop(require_admin).push(admin_routes())),
        )
}

fn public_routes() -> Router {
    Router::with_path("products")
        .get(products::index::handler)
        .push(
            Router::with_path("{product}")
                .get(products::get::handler)
                .push(Router::with_path("availability").get(products::availability::handler)),
        )
}

fn customer_routes() -> Router {
    Router::new()
        .push(
            Router::with_path("bookings")
                .get(bookings::index::handler)
                .post(bookings::create::handler)
                .push(
                    Router::with_path("{booking}")
                        .get(bookings::get::handler)
                        .put(bookings::update::handler)
                        .push(Router::with_path("confirm").post(bookings::transitions::confirm))
                        .push(Router::with_path("cancel").post(bookings::transitions::cancel)),
                ),
        )
        .push(
            Router::with_path("payments")
                .push(Router::with_path("create-intent").post(payments::create_intent::handler))
                .push(Router::with_path("confirm").post(payments::confirm::handler))
                .push(Router::with_path("{payment}/status").get(payments::status::handler)),
        )
}

fn admin_routes() -> Router {
    Router::new()
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::with_path("bookings/{booking}")
                .push(Router::with_path("activate").post(bookings::transitions::activate))
                .push(Router::with_path("complete").post(bookings::transitions::complete)),
        )
        .push(Router::with_path("payments/refund").post(payments::refund::handler))
        .push(Router::with_path("reports/dashboard").get(reports::dashboard::handler))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::{StatusCode, header::AUTHORIZATION},
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use rentals_app::domain::{
        bookings::records::{BookingStatus, BookingUuid},
        pagination::Page,
    };

    use crate::{
        bookings::models::fixtures::make_booking,
        errors::ErrorResponse,
        test_helpers::{CUSTOMER_UUID, Mocks, admin, customer, make_service},
    };

    use super::*;

    #[tokio::test]
    async fn catalog_reads_need_no_credential() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.auth.expect_authenticate_bearer().never();
        mocks
            .products
            .expect_list_products()
            .once()
            .return_once(|_, page| Ok(Page::new(vec![], page, 0)));

        let res = TestClient::get("http://example.com/api/products")
            .send(&make_service(mocks, None, app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn bookings_need_a_credential() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.bookings.expect_list_bookings().never();

        let mut res = TestClient::get("http://example.com/api/bookings")
            .send(&make_service(mocks, None, app_router()))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
        assert_eq!(body.error.code, "NO_TOKEN");

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_write_the_catalog() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(customer()));
        mocks.products.expect_create_product().never();

        let mut res = TestClient::post("http://example.com/api/products")
            .add_header(AUTHORIZATION, "Bearer customer-token", true)
            .json(&json!({}))
            .send(&make_service(mocks, None, app_router()))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
        assert_eq!(body.error.code, "INSUFFICIENT_PERMISSIONS");

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_hand_over_bookings() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(customer()));
        mocks.bookings.expect_activate_booking().never();

        let res = TestClient::post(format!(
            "http://example.com/api/bookings/{}/activate",
            Uuid::now_v7()
        ))
        .add_header(AUTHORIZATION, "Bearer customer-token", true)
        .send(&make_service(mocks, None, app_router()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn admins_can_complete_bookings() -> TestResult {
        let uuid = BookingUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Ok(admin()));
        mocks
            .bookings
            .expect_complete_booking()
            .once()
            .withf(move |actor, booking| actor.is_admin() && *booking == uuid)
            .return_once(move |_, _| {
                Ok(make_booking(uuid, CUSTOMER_UUID, BookingStatus::Completed))
            });

        let res = TestClient::post(format!("http://example.com/api/bookings/{uuid}/complete"))
            .add_header(AUTHORIZATION, "Bearer admin-token", true)
            .send(&make_service(mocks, None, app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
