//! # Report Repository
//!
//! Read-only sales aggregation for the dashboard and reports screens.
//! Nothing here mutates state and nothing here has invariants to defend;
//! the interesting part is that every per-method figure goes through the
//! payment parser so legacy and split-tender rows aggregate identically.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use tindahan_core::payment::MethodTotals;
use tindahan_core::Money;

// =============================================================================
// Types
// =============================================================================

/// Time bucket size for the sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    /// Parses the query-string form used by the UI.
    pub fn parse(s: &str) -> Option<ReportPeriod> {
        match s {
            "daily" => Some(ReportPeriod::Daily),
            "weekly" => Some(ReportPeriod::Weekly),
            "monthly" => Some(ReportPeriod::Monthly),
            _ => None,
        }
    }

    /// The bucket key for a timestamp: the day itself, the Sunday starting
    /// its week, or the year-month.
    fn bucket_key(&self, at: DateTime<Utc>) -> String {
        let date = at.date_naive();
        match self {
            ReportPeriod::Daily => date.to_string(),
            ReportPeriod::Weekly => {
                let back = date.weekday().num_days_from_sunday() as i64;
                (date - Duration::days(back)).to_string()
            }
            ReportPeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }
}

/// One bucket of the sales report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    pub period: String,
    pub transaction_count: i64,
    pub cash_sales_cents: i64,
    pub gcash_sales_cents: i64,
    pub total_sales_cents: i64,
}

/// A best-selling product with catalog details joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub inventory: i64,
    pub price_cents: i64,
    pub total_sold: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for read-only sales reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales grouped into time buckets, oldest bucket first.
    ///
    /// Rows are fetched and bucketed in Rust rather than in SQL because
    /// the per-method split depends on parsing the payment field.
    pub async fn sales_report(
        &self,
        period: ReportPeriod,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<SalesBucket>> {
        let mut sql =
            String::from("SELECT total_cents, mop, created_at FROM sales WHERE 1=1");
        if from.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if to.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at");

        let mut query = sqlx::query_as::<_, (i64, String, DateTime<Utc>)>(&sql);
        if let Some(from) = from {
            query = query.bind(from.and_time(NaiveTime::MIN).and_utc());
        }
        if let Some(to) = to {
            // Inclusive end date: the window runs to the following midnight
            query = query.bind((to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc());
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut buckets: BTreeMap<String, SalesBucket> = BTreeMap::new();
        for (total_cents, mop, created_at) in rows {
            let key = period.bucket_key(created_at);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| SalesBucket {
                period: key,
                transaction_count: 0,
                cash_sales_cents: 0,
                gcash_sales_cents: 0,
                total_sales_cents: 0,
            });

            let mut totals = MethodTotals::default();
            totals.accumulate(&mop, Money::from_cents(total_cents));

            bucket.transaction_count += 1;
            bucket.cash_sales_cents += totals.cash_cents;
            bucket.gcash_sales_cents += totals.gcash_cents;
            bucket.total_sales_cents += total_cents;
        }

        Ok(buckets.into_values().collect())
    }

    /// Best sellers by total quantity sold.
    pub async fn top_products(&self, limit: i64) -> DbResult<Vec<TopProduct>> {
        let rows: Vec<(String, String, String, i64, i64, i64)> = sqlx::query_as(
            "SELECT p.id, p.name, p.sku, p.inventory, p.price_cents, SUM(si.quantity) AS total_sold
             FROM sale_items si
             JOIN products p ON p.id = si.product_id
             GROUP BY si.product_id
             ORDER BY total_sold DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(product_id, name, sku, inventory, price_cents, total_sold)| TopProduct {
                    product_id,
                    name,
                    sku,
                    inventory,
                    price_cents,
                    total_sold,
                },
            )
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use crate::repository::sale::CheckoutRequest;
    use tindahan_core::checkout::CartLine;
    use tindahan_core::Product;

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

    async fn sell(db: &Database, product_id: &str, quantity: i64, payment: &str) {
        db.sales()
            .checkout(&CheckoutRequest {
                cart: vec![CartLine {
                    product_id: product_id.to_string(),
                    quantity,
                }],
                discount_cents: 0,
                payment: payment.to_string(),
                customer_name: None,
                cashier_id: "cashier-1".to_string(),
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(ReportPeriod::parse("daily"), Some(ReportPeriod::Daily));
        assert_eq!(ReportPeriod::parse("weekly"), Some(ReportPeriod::Weekly));
        assert_eq!(ReportPeriod::parse("monthly"), Some(ReportPeriod::Monthly));
        assert_eq!(ReportPeriod::parse("hourly"), None);
    }

    #[test]
    fn test_weekly_bucket_starts_sunday() {
        // 2026-08-05 is a Wednesday; its week bucket is Sunday 2026-08-02.
        let wednesday = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();
        assert_eq!(ReportPeriod::Weekly.bucket_key(wednesday), "2026-08-02");

        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();
        assert_eq!(ReportPeriod::Weekly.bucket_key(sunday), "2026-08-02");
    }

    #[test]
    fn test_monthly_bucket_key() {
        let at = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();
        assert_eq!(ReportPeriod::Monthly.bucket_key(at), "2026-08");
    }

    #[tokio::test]
    async fn test_sales_report_splits_methods_per_bucket() {
        let db = test_db().await;
        let p = seed_product(&db, "RPT-1", 10000, 100).await;

        sell(&db, &p.id, 1, "Cash").await;
        sell(&db, &p.id, 2, "GCash").await;
        sell(
            &db,
            &p.id,
            3,
            r#"[{"method":"Cash","amount":100},{"method":"GCash","amount":200}]"#,
        )
        .await;

        let report = db
            .reports()
            .sales_report(ReportPeriod::Daily, None, None)
            .await
            .unwrap();

        // All three sales land in today's bucket.
        assert_eq!(report.len(), 1);
        let bucket = &report[0];
        assert_eq!(bucket.transaction_count, 3);
        // cash: 100.00 legacy + 100.00 split part
        assert_eq!(bucket.cash_sales_cents, 20000);
        // gcash: 200.00 legacy + 200.00 split part
        assert_eq!(bucket.gcash_sales_cents, 40000);
        assert_eq!(bucket.total_sales_cents, 60000);
    }

    #[tokio::test]
    async fn test_top_products_ranked_by_quantity() {
        let db = test_db().await;
        let slow = seed_product(&db, "SLOW-1", 5000, 100).await;
        let fast = seed_product(&db, "FAST-1", 1000, 100).await;

        sell(&db, &slow.id, 2, "Cash").await;
        sell(&db, &fast.id, 5, "Cash").await;
        sell(&db, &fast.id, 4, "Cash").await;

        let top = db.reports().top_products(5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].sku, "FAST-1");
        assert_eq!(top[0].total_sold, 9);
        assert_eq!(top[1].total_sold, 2);

        let limited = db.reports().top_products(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
