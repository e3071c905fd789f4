//! State

use std::sync::Arc;

use rentals_app::{
    auth::AuthService,
    context::AppContext,
    domain::{
        bookings::BookingsService, payments::PaymentsService, products::ProductsService,
        reports::ReportsService,
    },
};

/// Services shared by every handler.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) products: Arc<dyn ProductsService>,
    pub(crate) bookings: Arc<dyn BookingsService>,
    pub(crate) payments: Arc<dyn PaymentsService>,
    pub(crate) reports: Arc<dyn ReportsService>,
    pub(crate) auth: Arc<dyn AuthService>,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: &AppContext) -> Arc<Self> {
        Arc::new(Self {
            products: Arc::clone(&app.products),
            bookings: Arc::clone(&app.bookings),
            payments: Arc::clone(&app.payments),
            reports: Arc::clone(&app.reports),
            auth: Arc::clone(&app.auth),
        })
    }
}
