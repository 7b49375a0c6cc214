//! # Sale Repository
//!
//! The checkout and transaction-edit units of work.
//!
//! ## Checkout Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                                  │
//! │    1. look up every cart product            → ProductNotFound       │
//! │    2. price lines, check stock              → InsufficientStock     │
//! │    3. total = Σ subtotals − discount                                │
//! │    4. validate payment coverage             → PaymentInsufficient   │
//! │    5. INSERT sale row                                               │
//! │    6. INSERT line items (unit price frozen)                         │
//! │    7. guarded stock decrement per line:                             │
//! │         UPDATE products SET inventory = inventory - qty             │
//! │         WHERE id = ? AND inventory >= qty                           │
//! │       zero rows → a concurrent sale won the stock → abort           │
//! │  COMMIT (or roll back everything on any failure)                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guarded decrement in step 7, not the read in step 2, is what keeps
//! two overlapping checkouts from jointly overselling: the check in step 2
//! exists for a friendly early error, the WHERE clause is the enforcement.
//!
//! Editing a sale restores the old items' stock first, then re-runs the
//! same sequence against the new cart inside the same transaction, so a
//! failed edit leaves the original sale untouched.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use tindahan_core::checkout::{cart_totals, price_line, validate_cart, CartLine, PricedLine};
use tindahan_core::payment::{PaymentEntry, PaymentPlan};
use tindahan_core::{CoreError, Money, Product, Sale, SaleLineItem};

const SALE_COLUMNS: &str =
    "id, total_cents, discount_cents, mop, cashier_id, customer_name, created_at";
const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price_cents, subtotal_cents";

// =============================================================================
// Requests and Results
// =============================================================================

/// Everything a checkout needs. The cashier id comes from the caller's
/// identity context, never from client-controlled payload fields.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub cart: Vec<CartLine>,
    /// Absolute discount in centavos. Defaults to zero.
    pub discount_cents: i64,
    /// Raw payment description: a legacy method string or a JSON array of
    /// split payments.
    pub payment: String,
    pub customer_name: Option<String>,
    pub cashier_id: String,
}

/// What the caller gets back from a successful checkout or edit.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub total_cents: i64,
    /// Normalized payment breakdown with every amount resolved.
    pub payment_breakdown: Vec<PaymentEntry>,
}

/// Filters for listing sales. The time window is `start <= created_at < end`.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub cashier_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Runs a full checkout as one all-or-nothing unit of work.
    ///
    /// See the module docs for the exact sequence. On any failure nothing
    /// is persisted: no sale row, no line items, no stock movement.
    pub async fn checkout(&self, req: &CheckoutRequest) -> DbResult<CheckoutReceipt> {
        validate_cart(&req.cart)?;

        let mut tx = self.pool.begin().await?;

        let priced = price_cart(&mut tx, &req.cart).await?;
        let totals = cart_totals(&priced, req.discount_cents)?;
        let plan = PaymentPlan::validate(&req.payment, Money::from_cents(totals.total_cents))?;

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mop = plan.stored_field();

        sqlx::query(
            "INSERT INTO sales (id, total_cents, discount_cents, mop, cashier_id, customer_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale_id)
        .bind(totals.total_cents)
        .bind(totals.discount_cents)
        .bind(&mop)
        .bind(&req.cashier_id)
        .bind(&req.customer_name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        write_items_and_decrement(&mut tx, &sale_id, &priced).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            total = %Money::from_cents(totals.total_cents),
            lines = priced.len(),
            "Checkout committed"
        );

        Ok(CheckoutReceipt {
            sale_id,
            total_cents: totals.total_cents,
            payment_breakdown: plan.breakdown(Money::from_cents(totals.total_cents)),
        })
    }

    /// Replaces an existing sale's line items and payment info in place.
    ///
    /// Restores stock for every current item first, then re-runs the
    /// checkout validate-and-apply sequence for the new cart against the
    /// same sale row. One transaction end to end: if the new cart cannot
    /// be fulfilled even after restoration, the whole edit rolls back and
    /// the original sale and stock levels survive unchanged.
    pub async fn replace_items(
        &self,
        sale_id: &str,
        cart: &[CartLine],
        payment: &str,
    ) -> DbResult<CheckoutReceipt> {
        validate_cart(cart)?;

        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?"
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let old_items = sqlx::query_as::<_, SaleLineItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?"
        ))
        .bind(&sale.id)
        .fetch_all(&mut *tx)
        .await?;

        // Give the old quantities back before validating the new cart, so
        // an edit that shuffles quantities of the same product is judged
        // against the fully restored stock.
        for item in &old_items {
            let result = sqlx::query(
                "UPDATE products SET inventory = inventory + ?, updated_at = ? WHERE id = ?",
            )
            .bind(item.quantity)
            .bind(Utc::now())
            .bind(&item.product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::ProductNotFound(item.product_id.clone()).into());
            }
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?")
            .bind(&sale.id)
            .execute(&mut *tx)
            .await?;

        let priced = price_cart(&mut tx, cart).await?;
        // Edits carry no discount input; the stored total reflects the new
        // item set alone, and the discount column is cleared to keep
        // total = Σ subtotals − discount true.
        let totals = cart_totals(&priced, 0)?;
        let plan = PaymentPlan::validate(payment, Money::from_cents(totals.total_cents))?;
        let mop = plan.stored_field();

        sqlx::query("UPDATE sales SET total_cents = ?, discount_cents = 0, mop = ? WHERE id = ?")
            .bind(totals.total_cents)
            .bind(&mop)
            .bind(&sale.id)
            .execute(&mut *tx)
            .await?;

        write_items_and_decrement(&mut tx, &sale.id, &priced).await?;

        tx.commit().await?;

        info!(sale_id = %sale.id, total = %Money::from_cents(totals.total_cents), "Sale edited");

        Ok(CheckoutReceipt {
            sale_id: sale.id,
            total_cents: totals.total_cents,
            payment_breakdown: plan.breakdown(Money::from_cents(totals.total_cents)),
        })
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let items = sqlx::query_as::<_, SaleLineItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales, newest first, with optional cashier and date filters.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let mut sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE 1=1");
        if filter.cashier_id.is_some() {
            sql.push_str(" AND cashier_id = ?");
        }
        if filter.start.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if filter.end.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, Sale>(&sql);
        if let Some(cashier_id) = &filter.cashier_id {
            query = query.bind(cashier_id);
        }
        if let Some(start) = filter.start {
            query = query.bind(start);
        }
        if let Some(end) = filter.end {
            query = query.bind(end);
        }

        let sales = query.fetch_all(&self.pool).await?;
        Ok(sales)
    }
}

// =============================================================================
// Unit-of-Work Helpers
// =============================================================================

/// Looks up and prices every cart line inside the open transaction.
async fn price_cart(
    tx: &mut Transaction<'_, Sqlite>,
    cart: &[CartLine],
) -> DbResult<Vec<PricedLine>> {
    let mut priced = Vec::with_capacity(cart.len());

    for line in cart {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, sku, image, price_cents, inventory, category_id, created_at, updated_at
             FROM products WHERE id = ?",
        )
        .bind(&line.product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        priced.push(price_line(&product, line.quantity)?);
    }

    Ok(priced)
}

/// Writes the line items and applies the guarded stock decrements.
async fn write_items_and_decrement(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    priced: &[PricedLine],
) -> DbResult<()> {
    for line in priced {
        sqlx::query(
            "INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_cents, subtotal_cents)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sale_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.subtotal_cents)
        .execute(&mut **tx)
        .await?;

        debug!(product_id = %line.product_id, qty = %line.quantity, "Decrementing stock");

        let result = sqlx::query(
            "UPDATE products
             SET inventory = inventory - ?, updated_at = ?
             WHERE id = ? AND inventory >= ?",
        )
        .bind(line.quantity)
        .bind(Utc::now())
        .bind(&line.product_id)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            // The early check passed but the guard lost: either a racing
            // sale took the stock or the product vanished. Re-read for an
            // accurate error, then let the rollback undo everything.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT inventory FROM products WHERE id = ?")
                    .bind(&line.product_id)
                    .fetch_optional(&mut **tx)
                    .await?;

            return Err(match available {
                None => CoreError::ProductNotFound(line.product_id.clone()).into(),
                Some(available) => CoreError::InsufficientStock {
                    name: line.name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, sku: &str, price_cents: i64, inventory: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            image: None,
            price_cents,
            inventory,
            category_id: None,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn cash_checkout(product_id: &str, quantity: i64) -> CheckoutRequest {
        CheckoutRequest {
            cart: vec![CartLine {
                product_id: product_id.to_string(),
                quantity,
            }],
            discount_cents: 0,
            payment: "Cash".to_string(),
            customer_name: None,
            cashier_id: "cashier-1".to_string(),
        }
    }

    async fn inventory_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().inventory
    }

    #[tokio::test]
    async fn test_checkout_end_to_end() {
        let db = test_db().await;
        // Product P: price 100.00, stock 3
        let p = seed_product(&db, "P-100", 10000, 3).await;

        let receipt = db.sales().checkout(&cash_checkout(&p.id, 2)).await.unwrap();
        assert_eq!(receipt.total_cents, 20000);
        assert_eq!(receipt.payment_breakdown.len(), 1);
        assert_eq!(receipt.payment_breakdown[0].method, "Cash");
        assert_eq!(receipt.payment_breakdown[0].amount_cents, Some(20000));
        assert_eq!(inventory_of(&db, &p.id).await, 1);

        let sale = db.sales().get_by_id(&receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.total_cents, 20000);
        assert_eq!(sale.mop, "Cash");

        let items = db.sales().get_items(&receipt.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price_cents, 10000);
        assert_eq!(items[0].subtotal_cents, 20000);

        // Second checkout for 2 must fail - only 1 left - and must not
        // touch the remaining stock.
        let err = db.sales().checkout(&cash_checkout(&p.id, 2)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));
        assert_eq!(inventory_of(&db, &p.id).await, 1);
    }

    #[tokio::test]
    async fn test_failed_checkout_is_fully_rolled_back() {
        let db = test_db().await;
        let good = seed_product(&db, "GOOD-1", 5000, 10).await;

        // Line 2 references a product that doesn't exist; line 1 must not
        // leave any trace behind.
        let req = CheckoutRequest {
            cart: vec![
                CartLine {
                    product_id: good.id.clone(),
                    quantity: 3,
                },
                CartLine {
                    product_id: "missing".to_string(),
                    quantity: 1,
                },
            ],
            discount_cents: 0,
            payment: "Cash".to_string(),
            customer_name: None,
            cashier_id: "cashier-1".to_string(),
        };

        let err = db.sales().checkout(&req).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(ref id)) if id == "missing"
        ));

        assert_eq!(inventory_of(&db, &good.id).await, 10);
        assert!(db.sales().list(&SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_split_payment_coverage() {
        let db = test_db().await;
        let p = seed_product(&db, "SPLIT-1", 25000, 10).await;

        // Cart total 500.00; 300 + 200 covers it.
        let mut req = cash_checkout(&p.id, 2);
        req.payment = r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":200}]"#.into();
        let receipt = db.sales().checkout(&req).await.unwrap();
        assert_eq!(receipt.total_cents, 50000);
        assert_eq!(receipt.payment_breakdown.len(), 2);

        // Same cart, payments summing to 450 - rejected, no stock movement.
        let before = inventory_of(&db, &p.id).await;
        let mut req = cash_checkout(&p.id, 2);
        req.payment = r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":150}]"#.into();
        let err = db.sales().checkout(&req).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PaymentInsufficient {
                paid_cents: 45000,
                total_cents: 50000,
            })
        ));
        assert_eq!(inventory_of(&db, &p.id).await, before);
    }

    #[tokio::test]
    async fn test_discount_reduces_total() {
        let db = test_db().await;
        let p = seed_product(&db, "DISC-1", 10000, 5).await;

        let mut req = cash_checkout(&p.id, 2);
        req.discount_cents = 2500;
        let receipt = db.sales().checkout(&req).await.unwrap();
        assert_eq!(receipt.total_cents, 17500);

        let sale = db.sales().get_by_id(&receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.discount_cents, 2500);
    }

    #[tokio::test]
    async fn test_edit_restores_then_reapplies_stock() {
        let db = test_db().await;
        // Stock 10, sell 2 → 8. Edit the sale to qty 5: restoration makes
        // it 10 again, reapplying leaves 5 - not 3.
        let p = seed_product(&db, "EDIT-1", 10000, 10).await;

        let receipt = db.sales().checkout(&cash_checkout(&p.id, 2)).await.unwrap();
        assert_eq!(inventory_of(&db, &p.id).await, 8);

        let cart = [CartLine {
            product_id: p.id.clone(),
            quantity: 5,
        }];
        let edited = db
            .sales()
            .replace_items(&receipt.sale_id, &cart, "Cash")
            .await
            .unwrap();

        assert_eq!(edited.sale_id, receipt.sale_id);
        assert_eq!(edited.total_cents, 50000);
        assert_eq!(inventory_of(&db, &p.id).await, 5);

        let items = db.sales().get_items(&receipt.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_failed_edit_preserves_original_sale() {
        let db = test_db().await;
        let p = seed_product(&db, "EDIT-2", 10000, 10).await;

        let receipt = db.sales().checkout(&cash_checkout(&p.id, 2)).await.unwrap();
        assert_eq!(inventory_of(&db, &p.id).await, 8);

        // 2 restored → 10 available, but 11 requested: the edit fails and
        // everything snaps back.
        let cart = [CartLine {
            product_id: p.id.clone(),
            quantity: 11,
        }];
        let err = db
            .sales()
            .replace_items(&receipt.sale_id, &cart, "Cash")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));

        assert_eq!(inventory_of(&db, &p.id).await, 8);
        let items = db.sales().get_items(&receipt.sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        let sale = db.sales().get_by_id(&receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.total_cents, 20000);
    }

    #[tokio::test]
    async fn test_edit_of_missing_sale() {
        let db = test_db().await;
        let p = seed_product(&db, "EDIT-3", 10000, 10).await;

        let cart = [CartLine {
            product_id: p.id,
            quantity: 1,
        }];
        let err = db
            .sales()
            .replace_items("no-such-sale", &cart, "Cash")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::SaleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_cashier() {
        let db = test_db().await;
        let p = seed_product(&db, "LIST-1", 1000, 50).await;

        db.sales().checkout(&cash_checkout(&p.id, 1)).await.unwrap();
        let mut other = cash_checkout(&p.id, 1);
        other.cashier_id = "cashier-2".to_string();
        db.sales().checkout(&other).await.unwrap();

        let all = db.sales().list(&SaleFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = db
            .sales()
            .list(&SaleFilter {
                cashier_id: Some("cashier-2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].cashier_id, "cashier-2");
    }
}
