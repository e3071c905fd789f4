//! Products Repository

use std::collections::BTreeMap;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
    types::Json,
};
use uuid::Uuid;

use crate::{
    database::{amount_to_db, decode_error, try_get_amount},
    domain::{
        pagination::PageRequest,
        products::{
            data::{NewProduct, ProductFilter},
            records::{Inventory, ProductRecord, ProductUuid, RentalUnitPrice, RentalUnits},
        },
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCT_FOR_UPDATE_SQL: &str = include_str!("sql/get_product_for_update.sql");
const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DEACTIVATE_PRODUCT_SQL: &str = include_str!("sql/deactivate_product.sql");
const GET_RENTAL_UNITS_SQL: &str = include_str!("sql/get_rental_units.sql");
const CREATE_RENTAL_UNIT_SQL: &str = include_str!("sql/create_rental_unit.sql");
const DELETE_RENTAL_UNITS_SQL: &str = include_str!("sql/delete_rental_units.sql");
const RESERVE_INVENTORY_SQL: &str = include_str!("sql/reserve_inventory.sql");
const RELEASE_INVENTORY_SQL: &str = include_str!("sql/release_inventory.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let mut products = query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(search_pattern))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        self.attach_rental_units(tx, &mut products).await?;

        Ok(products)
    }

    pub(crate) async fn count_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_PRODUCTS_SQL)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(search_pattern))
            .fetch_one(&mut **tx)
            .await?;

        Ok(count.unsigned_abs())
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        self.fetch_one(tx, GET_PRODUCT_SQL, product).await
    }

    /// Fetch a product and hold its row lock until the transaction ends.
    pub(crate) async fn get_product_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        self.fetch_one(tx, GET_PRODUCT_FOR_UPDATE_SQL, product).await
    }

    /// Fetch several products at once, keyed by UUID. Missing products are
    /// simply absent from the map.
    pub(crate) async fn get_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, ProductRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();

        let mut records = query_as::<Postgres, ProductRecord>(GET_PRODUCTS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        self.attach_rental_units(tx, &mut records).await?;

        Ok(records
            .into_iter()
            .map(|record| (record.uuid, record))
            .collect())
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        let mut created = query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.images)
            .bind(Json(&product.specifications))
            .bind(product.is_rentable)
            .bind(amount_to_db(product.total_quantity, "total_quantity")?)
            .fetch_one(&mut **tx)
            .await?;

        self.insert_rental_units(tx, product.uuid, &product.rental_units)
            .await?;

        created.rental_units.clone_from(&product.rental_units);

        Ok(created)
    }

    /// Persist every mutable column of `product`. The reserved counter is
    /// never written here.
    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &ProductRecord,
    ) -> Result<ProductRecord, sqlx::Error> {
        let mut updated = query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.uuid)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.images)
            .bind(Json(&product.specifications))
            .bind(product.is_rentable)
            .bind(product.is_active)
            .bind(amount_to_db(product.inventory.total, "total_quantity")?)
            .bind(amount_to_db(
                product.inventory.available,
                "available_quantity",
            )?)
            .fetch_one(&mut **tx)
            .await?;

        updated.rental_units.clone_from(&product.rental_units);

        Ok(updated)
    }

    pub(crate) async fn replace_rental_units(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        rental_units: &RentalUnits,
    ) -> Result<(), sqlx::Error> {
        query(DELETE_RENTAL_UNITS_SQL)
            .bind(product)
            .execute(&mut **tx)
            .await?;

        self.insert_rental_units(tx, product, rental_units).await
    }

    pub(crate) async fn deactivate_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_PRODUCT_SQL)
            .bind(product)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Move `quantity` units from available to reserved in one conditional
    /// update. Returns `false` when the product is inactive or has too few
    /// units available.
    pub(crate) async fn reserve_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RESERVE_INVENTORY_SQL)
            .bind(product)
            .bind(amount_to_db(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Inverse of [`Self::reserve_inventory`]. Returns `false` when fewer
    /// than `quantity` units are reserved.
    pub(crate) async fn release_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RELEASE_INVENTORY_SQL)
            .bind(product)
            .bind(amount_to_db(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn fetch_one(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sql: &'static str,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        let record = query_as::<Postgres, ProductRecord>(sql)
            .bind(product)
            .fetch_one(&mut **tx)
            .await?;

        let mut records = vec![record];

        self.attach_rental_units(tx, &mut records).await?;

        records.pop().ok_or(sqlx::Error::RowNotFound)
    }

    async fn insert_rental_units(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        rental_units: &RentalUnits,
    ) -> Result<(), sqlx::Error> {
        for (position, tier) in rental_units.iter().enumerate() {
            query(CREATE_RENTAL_UNIT_SQL)
                .bind(product)
                .bind(i32::try_from(position).map_err(|error| decode_error("position", error))?)
                .bind(tier.unit.as_str())
                .bind(amount_to_db(tier.price, "price")?)
                .bind(
                    i32::try_from(tier.min_duration)
                        .map_err(|error| decode_error("min_duration", error))?,
                )
                .bind(
                    tier.max_duration
                        .map(i32::try_from)
                        .transpose()
                        .map_err(|error| decode_error("max_duration", error))?,
                )
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    async fn attach_rental_units(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &mut [ProductRecord],
    ) -> Result<(), sqlx::Error> {
        if products.is_empty() {
            return Ok(());
        }

        let uuids: Vec<Uuid> = products.iter().map(|p| p.uuid.into_uuid()).collect();

        let rows = query(GET_RENTAL_UNITS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut grouped: FxHashMap<Uuid, RentalUnits> = FxHashMap::default();

        for row in &rows {
            let product_uuid: Uuid = row.try_get("product_uuid")?;

            grouped
                .entry(product_uuid)
                .or_default()
                .push(rental_unit_from_row(row)?);
        }

        for product in products {
            if let Some(units) = grouped.remove(&product.uuid.into_uuid()) {
                product.rental_units = units;
            }
        }

        Ok(())
    }
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);

    pattern.push('%');

    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }

        pattern.push(c);
    }

    pattern.push('%');

    pattern
}

fn rental_unit_from_row(row: &PgRow) -> Result<RentalUnitPrice, sqlx::Error> {
    let unit: String = row.try_get("unit")?;
    let min_duration: i32 = row.try_get("min_duration")?;
    let max_duration: Option<i32> = row.try_get("max_duration")?;

    Ok(RentalUnitPrice {
        unit: unit.parse().map_err(|error| decode_error("unit", error))?,
        price: try_get_amount(row, "price")?,
        min_duration: u32::try_from(min_duration)
            .map_err(|error| decode_error("min_duration", error))?,
        max_duration: max_duration
            .map(u32::try_from)
            .transpose()
            .map_err(|error| decode_error("max_duration", error))?,
    })
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let specifications: Json<BTreeMap<String, String>> = row.try_get("specifications")?;

        Ok(Self {
            uuid: row.try_get("uuid")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            images: row.try_get("images")?,
            specifications: specifications.0,
            is_rentable: row.try_get("is_rentable")?,
            is_active: row.try_get("is_active")?,
            rental_units: RentalUnits::new(),
            inventory: Inventory {
                total: try_get_amount(row, "total_quantity")?,
                available: try_get_amount(row, "available_quantity")?,
                reserved: try_get_amount(row, "reserved_quantity")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
