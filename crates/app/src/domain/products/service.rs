//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::{Db, MAX_AMOUNT},
    domain::{
        pagination::{Page, PageRequest},
        products::{
            data::{Availability, DateRange, NewProduct, ProductFilter, ProductUpdate},
            errors::ProductsServiceError,
            records::{Inventory, ProductRecord, ProductUuid, RentalUnits},
            repository::PgProductsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

fn validate_rental_units(rental_units: &RentalUnits) -> Result<(), ProductsServiceError> {
    if rental_units.is_empty() {
        return Err(ProductsServiceError::MissingRentalUnits);
    }

    if !rental_units.iter().all(|tier| tier.is_valid()) {
        return Err(ProductsServiceError::InvalidRentalUnit);
    }

    let duplicate = rental_units.iter().enumerate().find(|(index, tier)| {
        rental_units[..*index]
            .iter()
            .any(|earlier| earlier.unit == tier.unit)
    });

    if let Some((_, tier)) = duplicate {
        return Err(ProductsServiceError::DuplicateRentalUnit(tier.unit));
    }

    Ok(())
}

/// Apply `update` to `product` in memory, rejecting an inconsistent result.
fn apply_update(
    product: &mut ProductRecord,
    update: ProductUpdate,
) -> Result<bool, ProductsServiceError> {
    if let Some(rental_units) = &update.rental_units {
        validate_rental_units(rental_units)?;
    }

    let inventory = Inventory {
        total: update.total_quantity.unwrap_or(product.inventory.total),
        available: update
            .available_quantity
            .unwrap_or(product.inventory.available),
        reserved: product.inventory.reserved,
    };

    if !inventory.is_consistent() {
        return Err(ProductsServiceError::InvalidInventory);
    }

    product.inventory = inventory;

    if let Some(name) = update.name {
        product.name = name;
    }

    if let Some(description) = update.description {
        product.description = description;
    }

    if let Some(category) = update.category {
        product.category = category;
    }

    if let Some(images) = update.images {
        product.images = images;
    }

    if let Some(specifications) = update.specifications {
        product.specifications = specifications;
    }

    if let Some(is_rentable) = update.is_rentable {
        product.is_rentable = is_rentable;
    }

    if let Some(is_active) = update.is_active {
        product.is_active = is_active;
    }

    let replace_units = update.rental_units.is_some();

    if let Some(rental_units) = update.rental_units {
        product.rental_units = rental_units;
    }

    Ok(replace_units)
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self
            .repository
            .list_products(&mut tx, &filter, page)
            .await?;

        let total = self.repository.count_products(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(Page::new(products, page, total))
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        if !product.is_active {
            return Err(ProductsServiceError::NotFound);
        }

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        validate_rental_units(&product.rental_units)?;

        if !(1..=MAX_AMOUNT).contains(&product.total_quantity) {
            return Err(ProductsServiceError::InvalidInventory);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, &product).await?;

        tx.commit().await?;

        info!(product = %created.uuid, total = created.inventory.total, "created product");

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .repository
            .get_product_for_update(&mut tx, product)
            .await?;

        let replace_units = apply_update(&mut record, update)?;

        if replace_units {
            self.repository
                .replace_rental_units(&mut tx, product, &record.rental_units)
                .await?;
        }

        let updated = self.repository.update_product(&mut tx, &record).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .deactivate_product(&mut tx, product)
            .await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(product = %product, "deactivated product");

        Ok(())
    }

    async fn check_availability(
        &self,
        product: ProductUuid,
        range: DateRange,
    ) -> Result<Availability, ProductsServiceError> {
        if !range.is_ordered() {
            return Err(ProductsServiceError::InvalidDateRange);
        }

        let product = self.get_product(product).await?;

        // Overlapping bookings are not consulted; the counters are the only source.
        Ok(Availability {
            available: product.is_available(),
            available_quantity: product.inventory.available,
            total_quantity: product.inventory.total,
        })
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves a page of active products.
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single active product.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product with all of its units available.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Patches a product, re-validating its inventory counters.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product. Existing bookings are untouched.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;

    /// Reports whether a product can currently be booked.
    async fn check_availability(
        &self,
        product: ProductUuid,
        range: DateRange,
    ) -> Result<Availability, ProductsServiceError>;
}
