//! Day snapshot, close, and history endpoints.
//!
//! "Today" is resolved here, at the edge, and passed down as an explicit
//! date - the repositories never read the clock to decide which day they
//! are aggregating.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use tindahan_core::DailyReconciliation;
use tindahan_db::repository::reconciliation::DaySnapshot;

use crate::error::ApiError;
use crate::identity::Cashier;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(today_snapshot))
        .route("/close", post(close_day))
        .route("/history", get(history))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloseBody {
    actual_cash_cents: i64,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: Option<i64>,
}

async fn today_snapshot(
    State(state): State<AppState>,
) -> Result<Json<DaySnapshot>, ApiError> {
    let today = Utc::now().date_naive();
    let snapshot = state.db.reconciliation().day_snapshot(today).await?;
    Ok(Json(snapshot))
}

async fn close_day(
    State(state): State<AppState>,
    cashier: Cashier,
    Json(body): Json<CloseBody>,
) -> Result<(StatusCode, Json<DailyReconciliation>), ApiError> {
    let today = Utc::now().date_naive();
    let record = state
        .db
        .reconciliation()
        .close_day(today, body.actual_cash_cents, body.notes, &cashier.id)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DailyReconciliation>>, ApiError> {
    // Last 30 days by default, matching the dashboard's history panel.
    let limit = query.limit.unwrap_or(30).clamp(1, 365);
    let records = state
        .db
        .reconciliation()
        .history(query.from, query.to, limit)
        .await?;
    Ok(Json(records))
}
