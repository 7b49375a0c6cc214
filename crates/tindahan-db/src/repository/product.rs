//! # Product Repository
//!
//! Catalog operations: CRUD, lookup by SKU, and manual inventory
//! adjustment. Checkout-time stock decrements do NOT go through this
//! repository - they are part of the sale unit of work and live in
//! [`crate::repository::sale`] so they can share its transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tindahan_core::{CoreError, Product};

const PRODUCT_COLUMNS: &str =
    "id, name, sku, image, price_cents, inventory, category_id, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            "INSERT INTO products (id, name, sku, image, price_cents, inventory, category_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.image)
        .bind(product.price_cents)
        .bind(product.inventory)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product's catalog fields.
    ///
    /// Inventory is NOT written here; stock only moves through
    /// [`Self::adjust_inventory`] and the sale unit of work, so a stale
    /// catalog edit can never clobber a concurrent checkout's decrement.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET name = ?, sku = ?, image = ?, price_cents = ?, category_id = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.image)
        .bind(product.price_cents)
        .bind(&product.category_id)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a signed manual stock adjustment (restock or shrinkage).
    ///
    /// The update is guarded so the result can never go negative; a
    /// losing adjustment reports the actual available quantity.
    pub async fn adjust_inventory(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting inventory");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products
             SET inventory = inventory + ?, updated_at = ?
             WHERE id = ? AND inventory + ? >= 0",
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing product from an adjustment that would
            // drive stock below zero.
            return match self.get_by_id(id).await? {
                None => Err(DbError::not_found("Product", id)),
                Some(p) => Err(CoreError::InsufficientStock {
                    name: p.name,
                    available: p.inventory,
                    requested: -delta,
                }
                .into()),
            };
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Products at or below the given inventory threshold.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE inventory <= ? ORDER BY inventory, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample(sku: &str, price_cents: i64, inventory: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            image: None,
            price_cents,
            inventory,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample("COKE-330", 2500, 10);
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "COKE-330");
        assert_eq!(by_id.price_cents, 2500);

        let by_sku = repo.get_by_sku("COKE-330").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample("PAN-001", 500, 5)).await.unwrap();
        let err = repo.insert(&sample("PAN-001", 700, 3)).await.unwrap_err();
        assert!(err.is_unique_violation(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_adjust_inventory_guards_negative() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample("EGG-012", 900, 4);
        repo.insert(&product).await.unwrap();

        let restocked = repo.adjust_inventory(&product.id, 6).await.unwrap();
        assert_eq!(restocked.inventory, 10);

        let err = repo.adjust_inventory(&product.id, -11).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 10, .. })
        ));

        // Stock unchanged after the failed adjustment
        let current = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.inventory, 10);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample("A-1", 100, 2)).await.unwrap();
        repo.insert(&sample("B-2", 100, 50)).await.unwrap();

        let low = repo.low_stock(10).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].sku, "A-1");
    }
}
