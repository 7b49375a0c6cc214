//! # Expense Repository
//!
//! The expense log. Plain inserts and range queries; the day's total also
//! feeds the reconciliation snapshot.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tindahan_core::{CoreError, Expense, Money};
use tindahan_core::validation::validate_expense_amount;

const EXPENSE_COLUMNS: &str = "id, amount_cents, kind, location, notes, created_by, created_at";

/// A new expense to record.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount_cents: i64,
    pub kind: String,
    pub location: String,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense. The amount must be strictly positive.
    pub async fn insert(&self, new: &NewExpense) -> DbResult<Expense> {
        validate_expense_amount(new.amount_cents).map_err(CoreError::from)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            amount_cents: new.amount_cents,
            kind: new.kind.clone(),
            location: new.location.clone(),
            notes: new.notes.clone(),
            created_by: new.created_by.clone(),
            created_at: Utc::now(),
        };

        debug!(kind = %expense.kind, amount = %Money::from_cents(expense.amount_cents), "Recording expense");

        sqlx::query(
            "INSERT INTO expenses (id, amount_cents, kind, location, notes, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(expense.amount_cents)
        .bind(&expense.kind)
        .bind(&expense.location)
        .bind(&expense.notes)
        .bind(&expense.created_by)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists expenses, newest first, with an optional time window of
    /// `start <= created_at < end`.
    pub async fn list(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Expense>> {
        let mut sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1=1");
        if start.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if end.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, Expense>(&sql);
        if let Some(start) = start {
            query = query.bind(start);
        }
        if let Some(end) = end {
            query = query.bind(end);
        }

        let expenses = query.fetch_all(&self.pool).await?;
        Ok(expenses)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    fn new_expense(amount_cents: i64) -> NewExpense {
        NewExpense {
            amount_cents,
            kind: "Supplies".to_string(),
            location: "Main branch".to_string(),
            notes: None,
            created_by: "manager-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        repo.insert(&new_expense(5000)).await.unwrap();
        repo.insert(&new_expense(2500)).await.unwrap();

        let all = repo.list(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().map(|e| e.amount_cents).sum::<i64>(), 7500);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let err = repo.insert(&new_expense(0)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(repo.list(None, None).await.unwrap().is_empty());
    }
}
