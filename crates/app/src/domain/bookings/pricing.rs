//! Server-side booking pricing.
//!
//! Client-supplied prices are checked against the product's tiers rather than
//! trusted.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    database::MAX_AMOUNT,
    domain::{
        bookings::records::{BookingItem, BookingPricing},
        products::records::{ProductRecord, ProductUuid, RentalUnit},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("product {0} was not loaded")]
    UnknownProduct(ProductUuid),

    #[error("product {product} is not rented by the {unit}")]
    RentalUnitNotOffered {
        product: ProductUuid,
        unit: RentalUnit,
    },

    #[error("duration {duration} is outside the allowed range for product {product}")]
    DurationOutOfRange { product: ProductUuid, duration: u32 },

    #[error("unit price {quoted} for product {product} does not match {expected}")]
    UnitPriceMismatch {
        product: ProductUuid,
        quoted: u64,
        expected: u64,
    },

    #[error("booking total is too large")]
    Overflow,
}

/// Price `items` against the current tiers of `products`.
///
/// No discounts or late fees apply at creation, so the total equals the
/// subtotal.
///
/// # Errors
///
/// Returns an error when an item does not match its product's tiers or the
/// total overflows.
pub fn quote(
    items: &[BookingItem],
    products: &FxHashMap<ProductUuid, ProductRecord>,
) -> Result<BookingPricing, PricingError> {
    let mut subtotal: u64 = 0;

    for item in items {
        let product = products
            .get(&item.product_uuid)
            .ok_or(PricingError::UnknownProduct(item.product_uuid))?;

        let tier = product.rental_unit(item.rental_unit).ok_or(
            PricingError::RentalUnitNotOffered {
                product: item.product_uuid,
                unit: item.rental_unit,
            },
        )?;

        if !tier.accepts(item.duration) {
            return Err(PricingError::DurationOutOfRange {
                product: item.product_uuid,
                duration: item.duration,
            });
        }

        if tier.price != item.unit_price {
            return Err(PricingError::UnitPriceMismatch {
                product: item.product_uuid,
                quoted: item.unit_price,
                expected: tier.price,
            });
        }

        let line_total = item.line_total().ok_or(PricingError::Overflow)?;

        subtotal = subtotal
            .checked_add(line_total)
            .ok_or(PricingError::Overflow)?;
    }

    if subtotal > MAX_AMOUNT {
        return Err(PricingError::Overflow);
    }

    Ok(BookingPricing {
        subtotal,
        discount: 0,
        late_fees: 0,
        total: subtotal,
    })
}
