//! # Cart Pricing
//!
//! The pure half of the checkout workflow: validating a cart against the
//! catalog and computing the sale total. The persistent half - writing the
//! sale and decrementing stock in one unit of work - lives in the database
//! layer, which calls into these functions inside its transaction.
//!
//! ```text
//! cart lines ──► validate_cart ──► price_line (per product) ──► cart_totals
//!                                        │
//!                                        └─ InsufficientStock / quantity
//!                                           errors surface before anything
//!                                           is written
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Input
// =============================================================================

/// One requested line of a cart: which product, how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Checks the structural rules of a cart before any product lookups.
///
/// ## Rules
/// - must not be empty
/// - at most [`MAX_CART_LINES`] lines
/// - every quantity positive and within range
pub fn validate_cart(cart: &[CartLine]) -> CoreResult<()> {
    if cart.is_empty() {
        return Err(ValidationError::Required {
            field: "cart items".to_string(),
        }
        .into());
    }

    if cart.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        }
        .into());
    }

    for line in cart {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Priced Lines
// =============================================================================

/// A cart line priced against the catalog, unit price frozen.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: String,
    /// Product name, carried for error messages and receipts.
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// Prices one cart line against the product's current state.
///
/// Fails with [`CoreError::InsufficientStock`] when the requested quantity
/// exceeds current stock. The caller has already resolved the product;
/// missing products surface as `ProductNotFound` at the lookup site.
pub fn price_line(product: &Product, quantity: i64) -> CoreResult<PricedLine> {
    validate_quantity(quantity)?;

    if !product.can_fulfill(quantity) {
        return Err(CoreError::InsufficientStock {
            name: product.name.clone(),
            available: product.inventory,
            requested: quantity,
        });
    }

    Ok(PricedLine {
        product_id: product.id.clone(),
        name: product.name.clone(),
        quantity,
        unit_price_cents: product.price_cents,
        subtotal_cents: product.price().multiply_quantity(quantity).cents(),
    })
}

// =============================================================================
// Totals
// =============================================================================

/// Gross, discount, and final total for a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub gross_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Computes the sale total: Σ(line subtotals) − discount.
///
/// The discount must be non-negative. The resulting total is deliberately
/// NOT checked for sign here; a discount larger than the gross produces a
/// negative total that downstream payment validation accepts. See
/// DESIGN.md for the rationale behind keeping that behavior.
pub fn cart_totals(lines: &[PricedLine], discount_cents: i64) -> CoreResult<CartTotals> {
    if discount_cents < 0 {
        return Err(CoreError::invalid_amount("discount", "must not be negative"));
    }

    let gross_cents: i64 = lines.iter().map(|l| l.subtotal_cents).sum();

    Ok(CartTotals {
        gross_cents,
        discount_cents,
        total_cents: gross_cents - discount_cents,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn product(price_cents: i64, inventory: i64) -> Product {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        Product {
            id: "p-1".to_string(),
            name: "Pandesal".to_string(),
            sku: "PAN-001".to_string(),
            image: None,
            price_cents,
            inventory,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_cart_rejects_empty() {
        assert!(validate_cart(&[]).is_err());
        assert!(validate_cart(&[CartLine {
            product_id: "p-1".to_string(),
            quantity: 1,
        }])
        .is_ok());
    }

    #[test]
    fn test_validate_cart_rejects_bad_quantities() {
        let cart = [CartLine {
            product_id: "p-1".to_string(),
            quantity: 0,
        }];
        assert!(validate_cart(&cart).is_err());
    }

    #[test]
    fn test_price_line_snapshots_price() {
        let p = product(500, 10);
        let line = price_line(&p, 3).unwrap();
        assert_eq!(line.unit_price_cents, 500);
        assert_eq!(line.subtotal_cents, 1500);
    }

    #[test]
    fn test_price_line_insufficient_stock() {
        let p = product(500, 2);
        let err = price_line(&p, 3).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cart_totals_applies_discount() {
        let p = product(10000, 10);
        let lines = vec![price_line(&p, 2).unwrap()];
        let totals = cart_totals(&lines, 500).unwrap();
        assert_eq!(totals.gross_cents, 20000);
        assert_eq!(totals.total_cents, 19500);
    }

    #[test]
    fn test_cart_totals_rejects_negative_discount() {
        let p = product(10000, 10);
        let lines = vec![price_line(&p, 1).unwrap()];
        assert!(cart_totals(&lines, -1).is_err());
    }

    #[test]
    fn test_oversized_discount_goes_negative() {
        // Mirrors the recorded behavior: the engine does not clamp.
        let p = product(1000, 10);
        let lines = vec![price_line(&p, 1).unwrap()];
        let totals = cart_totals(&lines, 5000).unwrap();
        assert_eq!(totals.total_cents, -4000);
    }
}
