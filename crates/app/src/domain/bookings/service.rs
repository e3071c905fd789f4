//! Bookings service.

use std::{collections::BTreeMap, slice};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    auth::Principal,
    database::Db,
    domain::{
        bookings::{
            data::{BookingFilter, BookingUpdate, NewBooking},
            errors::BookingsServiceError,
            number, pricing,
            records::{BookingItem, BookingRecord, BookingStatus, BookingUuid},
            repositories::{BookingInsert, PgBookingItemsRepository, PgBookingsRepository},
            status::{self, InventoryEffect, Transition, TransitionActor},
        },
        pagination::{Page, PageRequest},
        products::{records::ProductUuid, repository::PgProductsRepository},
    },
};

/// Attempts at finding an unused booking number before giving up.
const BOOKING_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct PgBookingsService {
    db: Db,
    bookings: PgBookingsRepository,
    items: PgBookingItemsRepository,
    products: PgProductsRepository,
}

impl PgBookingsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            bookings: PgBookingsRepository::new(),
            items: PgBookingItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    /// Lock a booking, check the actor may see it and load its items.
    async fn lock_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.bookings.get_booking_for_update(tx, booking).await?;

        if !actor.can_access(record.customer_uuid) {
            return Err(BookingsServiceError::AccessDenied);
        }

        self.items
            .attach_items(tx, slice::from_mut(&mut record))
            .await?;

        Ok(record)
    }

    /// Apply `update` to a booking under its row lock.
    ///
    /// With `strict` set, a requested status must be a real transition; a
    /// generic update may instead repeat the current status as a no-op.
    async fn change_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
        update: BookingUpdate,
        strict: bool,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.lock_booking(&mut tx, actor, booking).await?;

        let transition = match update.status {
            Some(to) if strict || to != record.status => Some(authorize(actor, &record, to)?),
            _ => None,
        };

        if let Some(notes) = update.notes {
            record.notes = Some(notes);
        }

        if let Some(returned) = update.actual_return_date {
            if returned < record.dates.start {
                return Err(BookingsServiceError::InvalidReturnDate);
            }

            record.dates.actual_return = Some(returned);
        }

        if let Some(transition) = transition {
            record.status = transition.to;

            if transition.to == BookingStatus::Completed && record.dates.actual_return.is_none() {
                record.dates.actual_return = Some(Timestamp::now());
            }

            if transition.effect == InventoryEffect::Release {
                self.release_items(&mut tx, &record.items).await?;
            }
        }

        let mut updated = self.bookings.update_booking(&mut tx, &record).await?;
        updated.items = record.items;

        tx.commit().await?;

        if let Some(transition) = transition {
            info!(
                booking = %updated.uuid,
                booking_number = %updated.booking_number,
                from = %transition.from,
                to = %transition.to,
                released = transition.effect == InventoryEffect::Release,
                "booking status changed"
            );
        }

        Ok(updated)
    }

    /// Return the reserved units of `items` to available, one product at a
    /// time in ascending id order.
    async fn release_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[BookingItem],
    ) -> Result<(), BookingsServiceError> {
        for (product, quantity) in quantities_by_product(items)? {
            if !self
                .products
                .release_inventory(tx, product, quantity)
                .await?
            {
                return Err(BookingsServiceError::InventoryOutOfSync(product));
            }
        }

        Ok(())
    }
}

/// Check `to` is reachable from the booking's status and that `actor` may
/// request it.
fn authorize(
    actor: &Principal,
    record: &BookingRecord,
    to: BookingStatus,
) -> Result<Transition, BookingsServiceError> {
    let transition = status::transition(record.status, to)?;

    if transition.actor == TransitionActor::AdminOnly && !actor.is_admin() {
        return Err(BookingsServiceError::AccessDenied);
    }

    Ok(transition)
}

/// Total quantity per product, ordered by product id.
fn quantities_by_product(
    items: &[BookingItem],
) -> Result<BTreeMap<ProductUuid, u64>, BookingsServiceError> {
    let mut quantities = BTreeMap::new();

    for item in items {
        let quantity = quantities.entry(item.product_uuid).or_insert(0_u64);

        *quantity = quantity
            .checked_add(item.quantity)
            .ok_or(BookingsServiceError::InvalidData)?;
    }

    Ok(quantities)
}

fn validate_new_booking(booking: &NewBooking, now: Timestamp) -> Result<(), BookingsServiceError> {
    if booking.items.is_empty() {
        return Err(BookingsServiceError::MissingItems);
    }

    if !booking.dates.is_ordered() {
        return Err(BookingsServiceError::InvalidDateRange);
    }

    if booking.dates.start < now {
        return Err(BookingsServiceError::StartDateInPast);
    }

    if booking
        .items
        .iter()
        .any(|item| item.quantity == 0 || item.duration == 0)
    {
        return Err(BookingsServiceError::InvalidData);
    }

    Ok(())
}

#[async_trait]
impl BookingsService for PgBookingsService {
    async fn create_booking(
        &self,
        actor: &Principal,
        booking: NewBooking,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let now = Timestamp::now();

        validate_new_booking(&booking, now)?;

        let requested = quantities_by_product(&booking.items)?;
        let product_uuids: Vec<ProductUuid> = requested.keys().copied().collect();

        let mut tx = self.db.begin().await?;

        let products = self.products.get_products(&mut tx, &product_uuids).await?;

        for (uuid, quantity) in &requested {
            let product = products
                .get(uuid)
                .ok_or(BookingsServiceError::ProductNotFound(*uuid))?;

            if !product.is_active || !product.is_rentable {
                return Err(BookingsServiceError::ProductInactive(*uuid));
            }

            if product.inventory.available < *quantity {
                return Err(BookingsServiceError::InsufficientInventory(*uuid));
            }
        }

        let pricing = pricing::quote(&booking.items, &products)?;

        if let Some(quoted) = booking.quoted_total
            && quoted != pricing.total
        {
            return Err(BookingsServiceError::PricingMismatch(None));
        }

        // A failed reservation drops `tx`, rolling back the ones before it.
        for (uuid, quantity) in &requested {
            if !self
                .products
                .reserve_inventory(&mut tx, *uuid, *quantity)
                .await?
            {
                return Err(BookingsServiceError::InsufficientInventory(*uuid));
            }
        }

        let uuid = BookingUuid::new();
        let mut created = None;

        for _ in 0..BOOKING_NUMBER_ATTEMPTS {
            let booking_number = number::generate(now, &mut rand::thread_rng());

            let insert = BookingInsert {
                uuid,
                booking_number: &booking_number,
                customer_uuid: actor.uuid,
                start: booking.dates.start,
                end: booking.dates.end,
                pricing,
                delivery_address: booking.delivery_address.as_ref(),
                notes: booking.notes.as_deref(),
            };

            created = self.bookings.create_booking(&mut tx, &insert).await?;

            if created.is_some() {
                break;
            }

            warn!(%booking_number, "booking number already taken, regenerating");
        }

        let mut created = created.ok_or(BookingsServiceError::BookingNumberExhausted)?;

        self.items
            .create_booking_items(&mut tx, created.uuid, &booking.items)
            .await?;

        created.items = booking.items.into_iter().collect();

        tx.commit().await?;

        info!(
            booking = %created.uuid,
            booking_number = %created.booking_number,
            customer = %created.customer_uuid,
            total = created.pricing.total,
            reserved = ?requested,
            "created booking"
        );

        Ok(created)
    }

    async fn get_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.bookings.get_booking(&mut tx, booking).await?;

        if !actor.can_access(record.customer_uuid) {
            return Err(BookingsServiceError::AccessDenied);
        }

        self.items
            .attach_items(&mut tx, slice::from_mut(&mut record))
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_bookings(
        &self,
        actor: &Principal,
        filter: BookingFilter,
        page: PageRequest,
    ) -> Result<Page<BookingRecord>, BookingsServiceError> {
        let customer = (!actor.is_admin()).then_some(actor.uuid);

        let mut tx = self.db.begin().await?;

        let mut bookings = self
            .bookings
            .list_bookings(&mut tx, customer, filter.status, page)
            .await?;

        let total = self
            .bookings
            .count_bookings(&mut tx, customer, filter.status)
            .await?;

        self.items.attach_items(&mut tx, &mut bookings).await?;

        tx.commit().await?;

        Ok(Page::new(bookings, page, total))
    }

    async fn update_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
        update: BookingUpdate,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.change_booking(actor, booking, update, false).await
    }

    async fn confirm_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.change_booking(actor, booking, status_update(BookingStatus::Confirmed), true)
            .await
    }

    async fn cancel_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.change_booking(actor, booking, status_update(BookingStatus::Cancelled), true)
            .await
    }

    async fn activate_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.change_booking(actor, booking, status_update(BookingStatus::Active), true)
            .await
    }

    async fn complete_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.change_booking(actor, booking, status_update(BookingStatus::Completed), true)
            .await
    }
}

fn status_update(status: BookingStatus) -> BookingUpdate {
    BookingUpdate {
        status: Some(status),
        ..BookingUpdate::default()
    }
}

#[automock]
#[async_trait]
pub trait BookingsService: Send + Sync {
    /// Creates a pending booking and reserves its inventory, all or nothing.
    async fn create_booking(
        &self,
        actor: &Principal,
        booking: NewBooking,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Retrieves a booking owned by the actor, or any booking for an admin.
    async fn get_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Lists the actor's bookings, or every booking for an admin, newest first.
    async fn list_bookings(
        &self,
        actor: &Principal,
        filter: BookingFilter,
        page: PageRequest,
    ) -> Result<Page<BookingRecord>, BookingsServiceError>;

    /// Applies a limited patch. A status change follows the transition rules.
    async fn update_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
        update: BookingUpdate,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// `pending -> confirmed`.
    async fn confirm_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Cancels a non-terminal booking and releases its inventory.
    async fn cancel_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// `confirmed -> active`, when the rental is handed over.
    async fn activate_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// `active -> completed`, when the rental is returned. Releases inventory.
    async fn complete_booking(
        &self,
        actor: &Principal,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{
        domain::{
            bookings::status::InvalidTransition,
            products::{
                ProductsService,
                data::{DateRange, ProductUpdate},
                records::{Inventory, ProductRecord},
            },
        },
        test::{
            TestContext,
            helpers::{admin, booking_request, customer, create_product},
        },
    };

    use super::*;

    async fn inventory(ctx: &TestContext, product: &ProductRecord) -> TestResult<Inventory> {
        Ok(ctx.products.get_product(product.uuid).await?.inventory)
    }

    fn assert_invalid_status(result: Result<BookingRecord, BookingsServiceError>) {
        assert!(
            matches!(
                result,
                Err(BookingsServiceError::InvalidStatusTransition(
                    InvalidTransition { .. }
                ))
            ),
            "expected InvalidStatusTransition, got {result:?}"
        );
    }

    #[tokio::test]
    async fn booking_lifecycle_moves_inventory() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let tent = create_product(&ctx, "Tent", 5).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 2))
            .await?;

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.booking_number.starts_with("BK-"));
        assert_eq!(booking.items.len(), 1);
        assert_eq!(
            inventory(&ctx, &tent).await?,
            Inventory {
                total: 5,
                available: 3,
                reserved: 2
            }
        );

        let confirmed = ctx.bookings.confirm_booking(&renter, booking.uuid).await?;

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(inventory(&ctx, &tent).await?.available, 3);

        let cancelled = ctx.bookings.cancel_booking(&renter, booking.uuid).await?;

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(
            inventory(&ctx, &tent).await?,
            Inventory {
                total: 5,
                available: 5,
                reserved: 0
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_prices_on_the_server() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        let booking = ctx
            .bookings
            .create_booking(&customer(), booking_request(&tent, 2))
            .await?;

        // 2 units x 2 days x 2_500
        assert_eq!(booking.pricing.subtotal, 10_000);
        assert_eq!(booking.pricing.total, 10_000);

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_rejects_mismatched_quote() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        let mut request = booking_request(&tent, 1);
        request.quoted_total = Some(1);

        let result = ctx.bookings.create_booking(&customer(), request).await;

        assert!(
            matches!(result, Err(BookingsServiceError::PricingMismatch(_))),
            "expected PricingMismatch, got {result:?}"
        );
        assert_eq!(inventory(&ctx, &tent).await?.reserved, 0);

        Ok(())
    }

    #[tokio::test]
    async fn duration_beyond_column_limit_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        let mut request = booking_request(&tent, 1);
        if let Some(item) = request.items.first_mut() {
            item.duration = u32::MAX;
        }

        let result = ctx.bookings.create_booking(&customer(), request).await;

        assert!(
            matches!(result, Err(BookingsServiceError::InvalidRentalTerms(_))),
            "expected InvalidRentalTerms, got {result:?}"
        );
        assert_eq!(inventory(&ctx, &tent).await?.reserved, 0);

        Ok(())
    }

    #[tokio::test]
    async fn start_date_in_past_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let tent = create_product(&ctx, "Tent", 5).await?;

        let start = Timestamp::now() - SignedDuration::from_hours(1);
        let mut request = booking_request(&tent, 1);
        request.dates = DateRange {
            start,
            end: start + SignedDuration::from_hours(48),
        };

        let result = ctx.bookings.create_booking(&renter, request).await;

        assert!(
            matches!(result, Err(BookingsServiceError::StartDateInPast)),
            "expected StartDateInPast, got {result:?}"
        );

        let listed = ctx
            .bookings
            .list_bookings(&renter, BookingFilter::default(), PageRequest::new(None, None, 10))
            .await?;

        assert_eq!(listed.total, 0);
        assert_eq!(inventory(&ctx, &tent).await?.available, 5);

        Ok(())
    }

    #[tokio::test]
    async fn inverted_dates_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        let mut request = booking_request(&tent, 1);
        request.dates.end = request.dates.start;

        let result = ctx.bookings.create_booking(&customer(), request).await;

        assert!(
            matches!(result, Err(BookingsServiceError::InvalidDateRange)),
            "expected InvalidDateRange, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_and_inactive_products_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;
        let kayak = create_product(&ctx, "Kayak", 5).await?;

        ctx.products.delete_product(kayak.uuid).await?;

        let mut missing = booking_request(&tent, 1);
        let ghost = ProductUuid::new();
        if let Some(item) = missing.items.first_mut() {
            item.product_uuid = ghost;
        }

        let result = ctx.bookings.create_booking(&customer(), missing).await;

        assert!(
            matches!(result, Err(BookingsServiceError::ProductNotFound(uuid)) if uuid == ghost),
            "expected ProductNotFound, got {result:?}"
        );

        let result = ctx
            .bookings
            .create_booking(&customer(), booking_request(&kayak, 1))
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::ProductInactive(uuid)) if uuid == kayak.uuid),
            "expected ProductInactive, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn multi_item_booking_is_all_or_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;
        let stove = create_product(&ctx, "Stove", 1).await?;

        let mut request = booking_request(&tent, 2);
        request.items.extend(booking_request(&stove, 2).items);

        let result = ctx.bookings.create_booking(&customer(), request).await;

        assert!(
            matches!(result, Err(BookingsServiceError::InsufficientInventory(uuid)) if uuid == stove.uuid),
            "expected InsufficientInventory, got {result:?}"
        );
        assert_eq!(inventory(&ctx, &tent).await?.available, 5);
        assert_eq!(inventory(&ctx, &stove).await?.available, 1);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_product_lines_reserve_their_sum() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        let mut request = booking_request(&tent, 2);
        request.items.extend(booking_request(&tent, 1).items);

        ctx.bookings.create_booking(&customer(), request).await?;

        assert_eq!(
            inventory(&ctx, &tent).await?,
            Inventory {
                total: 5,
                available: 2,
                reserved: 3
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_bookings_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let canoe = create_product(&ctx, "Canoe", 1).await?;

        let first_renter = customer();
        let second_renter = customer();

        let (first, second) = tokio::join!(
            ctx.bookings
                .create_booking(&first_renter, booking_request(&canoe, 1)),
            ctx.bookings
                .create_booking(&second_renter, booking_request(&canoe, 1)),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        let shortages = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Err(BookingsServiceError::InsufficientInventory(_))))
            .count();

        assert_eq!(successes, 1, "first: {first:?}, second: {second:?}");
        assert_eq!(shortages, 1, "first: {first:?}, second: {second:?}");
        assert_eq!(
            inventory(&ctx, &canoe).await?,
            Inventory {
                total: 1,
                available: 0,
                reserved: 1
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn confirm_requires_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let staff = admin();
        let tent = create_product(&ctx, "Tent", 5).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 1))
            .await?;

        ctx.bookings.confirm_booking(&renter, booking.uuid).await?;
        assert_invalid_status(ctx.bookings.confirm_booking(&renter, booking.uuid).await);

        ctx.bookings.activate_booking(&staff, booking.uuid).await?;
        assert_invalid_status(ctx.bookings.confirm_booking(&renter, booking.uuid).await);

        ctx.bookings.complete_booking(&staff, booking.uuid).await?;
        assert_invalid_status(ctx.bookings.confirm_booking(&renter, booking.uuid).await);

        let cancelled = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 1))
            .await?;

        ctx.bookings.cancel_booking(&renter, cancelled.uuid).await?;
        assert_invalid_status(ctx.bookings.confirm_booking(&renter, cancelled.uuid).await);
        assert_invalid_status(ctx.bookings.cancel_booking(&renter, cancelled.uuid).await);

        Ok(())
    }

    #[tokio::test]
    async fn completion_records_return_and_releases() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let staff = admin();
        let tent = create_product(&ctx, "Tent", 3).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 3))
            .await?;

        ctx.bookings.confirm_booking(&renter, booking.uuid).await?;
        ctx.bookings.activate_booking(&staff, booking.uuid).await?;

        assert_eq!(inventory(&ctx, &tent).await?.available, 0);

        let completed = ctx.bookings.complete_booking(&staff, booking.uuid).await?;

        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.dates.actual_return.is_some());
        assert_eq!(
            inventory(&ctx, &tent).await?,
            Inventory {
                total: 3,
                available: 3,
                reserved: 0
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_hand_over_or_return() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let tent = create_product(&ctx, "Tent", 3).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 1))
            .await?;

        ctx.bookings.confirm_booking(&renter, booking.uuid).await?;

        let result = ctx.bookings.activate_booking(&renter, booking.uuid).await;

        assert!(
            matches!(result, Err(BookingsServiceError::AccessDenied)),
            "expected AccessDenied, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_customers_are_denied_and_admins_are_not() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = customer();
        let stranger = customer();
        let staff = admin();
        let tent = create_product(&ctx, "Tent", 5).await?;

        let booking = ctx
            .bookings
            .create_booking(&owner, booking_request(&tent, 1))
            .await?;

        for result in [
            ctx.bookings.get_booking(&stranger, booking.uuid).await,
            ctx.bookings.confirm_booking(&stranger, booking.uuid).await,
            ctx.bookings.cancel_booking(&stranger, booking.uuid).await,
        ] {
            assert!(
                matches!(result, Err(BookingsServiceError::AccessDenied)),
                "expected AccessDenied, got {result:?}"
            );
        }

        let fetched = ctx.bookings.get_booking(&staff, booking.uuid).await?;
        assert_eq!(fetched.uuid, booking.uuid);

        ctx.bookings.confirm_booking(&staff, booking.uuid).await?;
        let cancelled = ctx.bookings.cancel_booking(&staff, booking.uuid).await?;

        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.bookings.get_booking(&admin(), BookingUuid::new()).await;

        assert!(
            matches!(result, Err(BookingsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_routes_status_through_transitions() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let tent = create_product(&ctx, "Tent", 4).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 4))
            .await?;

        let unchanged = ctx
            .bookings
            .update_booking(
                &renter,
                booking.uuid,
                BookingUpdate {
                    status: Some(BookingStatus::Pending),
                    notes: Some("leave at the front desk".to_string()),
                    ..BookingUpdate::default()
                },
            )
            .await?;

        assert_eq!(unchanged.status, BookingStatus::Pending);
        assert_eq!(unchanged.notes.as_deref(), Some("leave at the front desk"));

        let cancelled = ctx
            .bookings
            .update_booking(
                &renter,
                booking.uuid,
                BookingUpdate {
                    status: Some(BookingStatus::Cancelled),
                    ..BookingUpdate::default()
                },
            )
            .await?;

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(inventory(&ctx, &tent).await?.available, 4);

        let reopened = ctx
            .bookings
            .update_booking(
                &admin(),
                booking.uuid,
                BookingUpdate {
                    status: Some(BookingStatus::Pending),
                    ..BookingUpdate::default()
                },
            )
            .await;

        assert_invalid_status(reopened);

        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_return_before_start() -> TestResult {
        let ctx = TestContext::new().await;
        let renter = customer();
        let tent = create_product(&ctx, "Tent", 4).await?;

        let booking = ctx
            .bookings
            .create_booking(&renter, booking_request(&tent, 1))
            .await?;

        let result = ctx
            .bookings
            .update_booking(
                &renter,
                booking.uuid,
                BookingUpdate {
                    actual_return_date: Some(booking.dates.start - SignedDuration::from_hours(1)),
                    ..BookingUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::InvalidReturnDate)),
            "expected InvalidReturnDate, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_bookings_scopes_customers_and_filters_status() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = customer();
        let bob = customer();
        let staff = admin();
        let tent = create_product(&ctx, "Tent", 10).await?;

        let first = ctx
            .bookings
            .create_booking(&alice, booking_request(&tent, 1))
            .await?;
        ctx.bookings
            .create_booking(&alice, booking_request(&tent, 1))
            .await?;
        ctx.bookings
            .create_booking(&bob, booking_request(&tent, 1))
            .await?;

        ctx.bookings.cancel_booking(&alice, first.uuid).await?;

        let page = PageRequest::new(Some(1), Some(10), 10);

        let mine = ctx
            .bookings
            .list_bookings(&alice, BookingFilter::default(), page)
            .await?;

        assert_eq!(mine.total, 2);
        assert!(mine.items.iter().all(|b| b.customer_uuid == alice.uuid));
        assert!(mine.items.iter().all(|b| b.items.len() == 1));

        let everyone = ctx
            .bookings
            .list_bookings(&staff, BookingFilter::default(), page)
            .await?;

        assert_eq!(everyone.total, 3);

        let cancelled = ctx
            .bookings
            .list_bookings(
                &staff,
                BookingFilter {
                    status: Some(BookingStatus::Cancelled),
                },
                page,
            )
            .await?;

        assert_eq!(cancelled.total, 1);
        assert_eq!(cancelled.items.first().map(|b| b.uuid), Some(first.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn lowering_stock_below_reservations_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let tent = create_product(&ctx, "Tent", 5).await?;

        ctx.bookings
            .create_booking(&customer(), booking_request(&tent, 3))
            .await?;

        let result = ctx
            .products
            .update_product(
                tent.uuid,
                ProductUpdate {
                    total_quantity: Some(2),
                    available_quantity: Some(0),
                    ..ProductUpdate::default()
                },
            )
            .await;

        assert!(result.is_err(), "total below reserved must fail: {result:?}");
        assert_eq!(inventory(&ctx, &tent).await?.reserved, 3);

        Ok(())
    }
}
