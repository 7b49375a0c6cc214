//! Cash float endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use tindahan_core::CashFloat;

use crate::error::ApiError;
use crate::identity::Cashier;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(set_float).get(get_float))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetFloatBody {
    amount_cents: i64,
    /// Defaults to today when the register declares its opening float.
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct FloatQuery {
    date: Option<NaiveDate>,
}

async fn set_float(
    State(state): State<AppState>,
    _cashier: Cashier,
    Json(body): Json<SetFloatBody>,
) -> Result<(StatusCode, Json<CashFloat>), ApiError> {
    let date = body.date.unwrap_or_else(|| Utc::now().date_naive());
    let float = state
        .db
        .reconciliation()
        .set_float(date, body.amount_cents)
        .await?;

    Ok((StatusCode::CREATED, Json(float)))
}

async fn get_float(
    State(state): State<AppState>,
    Query(query): Query<FloatQuery>,
) -> Result<Json<Option<CashFloat>>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let float = state.db.reconciliation().float_for(date).await?;
    Ok(Json(float))
}
