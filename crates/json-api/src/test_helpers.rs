//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, catcher::Catcher, prelude::*};
use uuid::Uuid;

use rentals_app::{
    auth::{MockAuthService, Principal, Role},
    domain::{
        bookings::MockBookingsService, payments::MockPaymentsService,
        products::MockProductsService, reports::MockReportsService,
    },
};

use crate::{errors::catch_status_errors, state::State};

pub(crate) const CUSTOMER_UUID: Uuid = Uuid::from_u128(0x0001);
pub(crate) const OTHER_CUSTOMER_UUID: Uuid = Uuid::from_u128(0x0002);
pub(crate) const ADMIN_UUID: Uuid = Uuid::from_u128(0x00ad);

/// A fixed instant so serialized timestamps are predictable.
pub(crate) fn timestamp() -> Timestamp {
    Timestamp::from_second(1_772_323_200).unwrap_or(Timestamp::UNIX_EPOCH)
}

pub(crate) fn customer() -> Principal {
    Principal {
        uuid: CUSTOMER_UUID,
        email: "customer@example.com".to_string(),
        role: Role::Customer,
    }
}

pub(crate) fn admin() -> Principal {
    Principal {
        uuid: ADMIN_UUID,
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    }
}

/// Service mocks. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub products: MockProductsService,
    pub bookings: MockBookingsService,
    pub payments: MockPaymentsService,
    pub reports: MockReportsService,
    pub auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        Arc::new(State {
            products: Arc::new(self.products),
            bookings: Arc::new(self.bookings),
            payments: Arc::new(self.payments),
            reports: Arc::new(self.reports),
            auth: Arc::new(self.auth),
        })
    }
}

/// Serve `route` with mocked services, as `principal` when one is given.
pub(crate) fn make_service(mocks: Mocks, principal: Option<Principal>, route: Router) -> Service {
    let mut router = Router::new().hoop(inject(mocks.into_state()));

    if let Some(principal) = principal {
        router = router.hoop(inject(principal));
    }

    Service::new(router.push(route)).catcher(Catcher::default().hoop(catch_status_errors))
}
