//! Test context for service-level integration tests.

use crate::{
    database::Db,
    domain::{
        bookings::PgBookingsService, payments::PgPaymentsService, products::PgProductsService,
        reports::PgReportsService,
    },
};

use super::db::TestDb;

/// Every service wired to one fresh, migrated database.
pub(crate) struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub bookings: PgBookingsService,
    pub payments: PgPaymentsService,
    pub reports: PgReportsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            bookings: PgBookingsService::new(db.clone()),
            payments: PgPaymentsService::new(db.clone()),
            reports: PgReportsService::new(db),
            db: test_db,
        }
    }
}
