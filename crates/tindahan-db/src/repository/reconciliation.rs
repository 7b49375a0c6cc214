//! # Reconciliation Repository
//!
//! Cash floats and the end-of-day close.
//!
//! ## Day Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  OPEN (no reconciliation row for the date)                          │
//! │    • set_float may overwrite the day's declared starting cash       │
//! │    • day_snapshot shows live expected-cash figures                  │
//! │            │                                                        │
//! │            ▼  close_day(date, counted, notes, operator)             │
//! │  CLOSED (row exists, immutable)                                     │
//! │    • second close → AlreadyClosed                                   │
//! │    • no update or delete path, ever                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UNIQUE(date) constraint on the reconciliations table is the
//! authority for "is this day closed" - the pre-check only exists for a
//! friendly error. Two near-simultaneous closes cannot both insert.
//!
//! Every operation takes the business date explicitly; nothing here reads
//! the wall clock to decide what "today" is.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tindahan_core::payment::{cash_amount, non_cash_amount};
use tindahan_core::{CashFloat, CoreError, DailyReconciliation, Money};

const RECONCILIATION_COLUMNS: &str = "id, date, starting_cash_cents, expected_cash_cents, \
     actual_cash_cents, cash_difference_cents, cash_sales_cents, non_cash_sales_cents, \
     expense_total_cents, transaction_count, notes, closed_by, created_at";

// =============================================================================
// Snapshot
// =============================================================================

/// Live view of one business day, served to the dashboard before (and
/// after) closing. Read-only; computing it never changes state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub starting_cash_cents: i64,
    pub cash_sales_cents: i64,
    pub non_cash_sales_cents: i64,
    pub total_sales_cents: i64,
    pub expected_cash_cents: i64,
    pub expense_total_cents: i64,
    pub transaction_count: i64,
    pub average_sale_cents: i64,
    pub is_reconciled: bool,
    /// The stored close record, once the day is closed.
    pub reconciliation: Option<DailyReconciliation>,
}

/// Aggregated figures for one day's sales, derived through the payment
/// parser so split tenders land in the right bucket.
#[derive(Debug, Default, Clone, Copy)]
struct DayTotals {
    cash_cents: i64,
    non_cash_cents: i64,
    total_cents: i64,
    transaction_count: i64,
    expense_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cash floats and daily reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: SqlitePool,
}

impl ReconciliationRepository {
    /// Creates a new ReconciliationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Cash float
    // -------------------------------------------------------------------------

    /// Declares the starting cash for a date.
    ///
    /// Upsert keyed by date: declaring twice for the same day overwrites
    /// the amount (last write wins), rather than accumulating ambiguous
    /// duplicate records.
    pub async fn set_float(&self, date: NaiveDate, amount_cents: i64) -> DbResult<CashFloat> {
        if amount_cents < 0 {
            return Err(CoreError::invalid_amount("starting cash", "must not be negative").into());
        }

        debug!(%date, amount = %Money::from_cents(amount_cents), "Setting cash float");

        let now = Utc::now();

        sqlx::query(
            "INSERT INTO cash_floats (id, date, amount_cents, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(date) DO UPDATE SET amount_cents = excluded.amount_cents, updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(date)
        .bind(amount_cents)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.float_for(date)
            .await?
            .ok_or_else(|| DbError::not_found("CashFloat", date.to_string()))
    }

    /// The declared float for a date, if any.
    pub async fn float_for(&self, date: NaiveDate) -> DbResult<Option<CashFloat>> {
        let float = sqlx::query_as::<_, CashFloat>(
            "SELECT id, date, amount_cents, created_at, updated_at FROM cash_floats WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(float)
    }

    // -------------------------------------------------------------------------
    // Snapshot and close
    // -------------------------------------------------------------------------

    /// Read-only aggregation of a day: float, cash/non-cash sales,
    /// expenses, and whether the day has been closed.
    pub async fn day_snapshot(&self, date: NaiveDate) -> DbResult<DaySnapshot> {
        let starting_cash_cents = self
            .float_for(date)
            .await?
            .map(|f| f.amount_cents)
            .unwrap_or(0);

        let totals = self.aggregate_day(date).await?;
        let reconciliation = self.for_date(date).await?;

        let average_sale_cents = if totals.transaction_count > 0 {
            totals.total_cents / totals.transaction_count
        } else {
            0
        };

        Ok(DaySnapshot {
            date,
            starting_cash_cents,
            cash_sales_cents: totals.cash_cents,
            non_cash_sales_cents: totals.non_cash_cents,
            total_sales_cents: totals.total_cents,
            expected_cash_cents: starting_cash_cents + totals.cash_cents,
            expense_total_cents: totals.expense_cents,
            transaction_count: totals.transaction_count,
            average_sale_cents,
            is_reconciled: reconciliation.is_some(),
            reconciliation,
        })
    }

    /// Closes out a calendar day exactly once.
    ///
    /// ## Sequence
    /// 1. reject a negative counted amount before touching anything
    /// 2. fail with `AlreadyClosed` if a row for the date exists
    /// 3. aggregate the day's sales (via the payment parser) and expenses
    /// 4. expected = float + cash sales; difference = counted − expected
    /// 5. insert the snapshot row; a UNIQUE(date) violation from a racing
    ///    close also surfaces as `AlreadyClosed`
    pub async fn close_day(
        &self,
        date: NaiveDate,
        actual_cash_cents: i64,
        notes: Option<String>,
        closed_by: &str,
    ) -> DbResult<DailyReconciliation> {
        if actual_cash_cents < 0 {
            return Err(CoreError::invalid_amount("actual cash", "must not be negative").into());
        }

        if self.for_date(date).await?.is_some() {
            return Err(CoreError::AlreadyClosed { date }.into());
        }

        let starting_cash_cents = self
            .float_for(date)
            .await?
            .map(|f| f.amount_cents)
            .unwrap_or(0);

        let totals = self.aggregate_day(date).await?;

        let expected_cash_cents = starting_cash_cents + totals.cash_cents;
        let cash_difference_cents = actual_cash_cents - expected_cash_cents;

        let record = DailyReconciliation {
            id: Uuid::new_v4().to_string(),
            date,
            starting_cash_cents,
            expected_cash_cents,
            actual_cash_cents,
            cash_difference_cents,
            cash_sales_cents: totals.cash_cents,
            non_cash_sales_cents: totals.non_cash_cents,
            expense_total_cents: totals.expense_cents,
            transaction_count: totals.transaction_count,
            notes,
            closed_by: closed_by.to_string(),
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO reconciliations (id, date, starting_cash_cents, expected_cash_cents, \
             actual_cash_cents, cash_difference_cents, cash_sales_cents, non_cash_sales_cents, \
             expense_total_cents, transaction_count, notes, closed_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.date)
        .bind(record.starting_cash_cents)
        .bind(record.expected_cash_cents)
        .bind(record.actual_cash_cents)
        .bind(record.cash_difference_cents)
        .bind(record.cash_sales_cents)
        .bind(record.non_cash_sales_cents)
        .bind(record.expense_total_cents)
        .bind(record.transaction_count)
        .bind(&record.notes)
        .bind(&record.closed_by)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) => {
                let db_err = DbError::from(e);
                // Lost a close race: the other register's row is already
                // the truth for this date.
                if db_err.is_unique_violation() {
                    return Err(CoreError::AlreadyClosed { date }.into());
                }
                return Err(db_err);
            }
        }

        info!(
            %date,
            expected = %Money::from_cents(expected_cash_cents),
            counted = %Money::from_cents(actual_cash_cents),
            difference = %Money::from_cents(cash_difference_cents),
            "Day closed"
        );

        Ok(record)
    }

    /// The stored reconciliation for a date, if the day is closed.
    pub async fn for_date(&self, date: NaiveDate) -> DbResult<Option<DailyReconciliation>> {
        let record = sqlx::query_as::<_, DailyReconciliation>(&format!(
            "SELECT {RECONCILIATION_COLUMNS} FROM reconciliations WHERE date = ?"
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Reconciliation history, newest date first.
    pub async fn history(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
    ) -> DbResult<Vec<DailyReconciliation>> {
        let mut sql = format!("SELECT {RECONCILIATION_COLUMNS} FROM reconciliations WHERE 1=1");
        if from.is_some() {
            sql.push_str(" AND date >= ?");
        }
        if to.is_some() {
            sql.push_str(" AND date <= ?");
        }
        sql.push_str(" ORDER BY date DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, DailyReconciliation>(&sql);
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(to) = to {
            query = query.bind(to);
        }
        query = query.bind(limit);

        let records = query.fetch_all(&self.pool).await?;
        Ok(records)
    }

    // -------------------------------------------------------------------------
    // Aggregation
    // -------------------------------------------------------------------------

    /// Sums the date's sales into cash/non-cash buckets plus the expense
    /// total, over the [00:00, next day 00:00) UTC window.
    async fn aggregate_day(&self, date: NaiveDate) -> DbResult<DayTotals> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT total_cents, mop FROM sales WHERE created_at >= ? AND created_at < ?")
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?;

        let mut totals = DayTotals {
            transaction_count: rows.len() as i64,
            ..Default::default()
        };

        for (total_cents, mop) in &rows {
            let total = Money::from_cents(*total_cents);
            totals.total_cents += total.cents();
            totals.cash_cents += cash_amount(mop, total).cents();
            totals.non_cash_cents += non_cash_amount(mop, total).cents();
        }

        totals.expense_cents = expense_total_between(&self.pool, start, end).await?;

        Ok(totals)
    }
}

/// Total of expenses logged within a time window.
async fn expense_total_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================
