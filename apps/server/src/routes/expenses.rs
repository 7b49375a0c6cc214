//! Expense log endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;

use tindahan_core::Expense;
use tindahan_db::repository::expense::NewExpense;

use crate::error::ApiError;
use crate::identity::Cashier;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_expense).get(list_expenses))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseBody {
    amount_cents: i64,
    kind: String,
    location: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpenseQuery {
    from: Option<NaiveDate>,
    /// Inclusive end date.
    to: Option<NaiveDate>,
}

async fn create_expense(
    State(state): State<AppState>,
    cashier: Cashier,
    Json(body): Json<ExpenseBody>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    if body.kind.trim().is_empty() {
        return Err(ApiError::validation("kind is required"));
    }
    if body.location.trim().is_empty() {
        return Err(ApiError::validation("location is required"));
    }

    let expense = state
        .db
        .expenses()
        .insert(&NewExpense {
            amount_cents: body.amount_cents,
            kind: body.kind.trim().to_string(),
            location: body.location.trim().to_string(),
            notes: body.notes,
            created_by: cashier.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let start = query.from.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let end = query
        .to
        .map(|d| (d + Duration::days(1)).and_time(NaiveTime::MIN).and_utc());

    let expenses = state.db.expenses().list(start, end).await?;
    Ok(Json(expenses))
}
