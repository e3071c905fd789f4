//! Test Helpers

use std::collections::BTreeMap;

use jiff::{SignedDuration, Timestamp};
use smallvec::smallvec;
use uuid::Uuid;

use crate::{
    auth::{Principal, Role},
    domain::{
        bookings::{data::NewBooking, records::BookingItem},
        products::{
            ProductsService, ProductsServiceError,
            data::{DateRange, NewProduct},
            records::{ProductRecord, ProductUuid, RentalUnit, RentalUnitPrice},
        },
    },
    test::TestContext,
};

/// Daily price of every product built by [`new_product`].
pub(crate) const DAILY_PRICE: u64 = 2_500;

/// Days requested by [`booking_request`].
pub(crate) const RENTAL_DAYS: u32 = 2;

pub(crate) fn new_product(name: &str, total_quantity: u64) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        description: format!("{name} for hire"),
        category: "camping".to_string(),
        images: Vec::new(),
        specifications: BTreeMap::new(),
        is_rentable: true,
        rental_units: smallvec![RentalUnitPrice {
            unit: RentalUnit::Day,
            price: DAILY_PRICE,
            min_duration: 1,
            max_duration: Some(30),
        }],
        total_quantity,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    total_quantity: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(new_product(name, total_quantity))
        .await
}

pub(crate) fn customer() -> Principal {
    let uuid = Uuid::now_v7();

    Principal {
        uuid,
        email: format!("{}@customers.test", uuid.simple()),
        role: Role::Customer,
    }
}

pub(crate) fn admin() -> Principal {
    Principal {
        uuid: Uuid::now_v7(),
        email: "staff@rentals.test".to_string(),
        role: Role::Admin,
    }
}

/// A two-day booking of `quantity` units starting tomorrow.
pub(crate) fn booking_request(product: &ProductRecord, quantity: u64) -> NewBooking {
    let start = Timestamp::now() + SignedDuration::from_hours(24);

    NewBooking {
        items: vec![BookingItem {
            product_uuid: product.uuid,
            quantity,
            unit_price: DAILY_PRICE,
            rental_unit: RentalUnit::Day,
            duration: RENTAL_DAYS,
        }],
        dates: DateRange {
            start,
            end: start + SignedDuration::from_hours(24 * i64::from(RENTAL_DAYS)),
        },
        quoted_total: None,
        delivery_address: None,
        notes: None,
    }
}
