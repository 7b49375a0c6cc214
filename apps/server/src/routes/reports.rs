//! Read-only reporting endpoints.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use tindahan_core::Product;
use tindahan_db::repository::report::{ReportPeriod, SalesBucket, TopProduct};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales_report))
        .route("/top-products", get(top_products))
        .route("/low-stock", get(low_stock))
}

#[derive(Debug, Deserialize)]
struct SalesQuery {
    period: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct TopQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LowStockQuery {
    threshold: Option<i64>,
}

async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<SalesBucket>>, ApiError> {
    let period = query.period.as_deref().unwrap_or("daily");
    let period = ReportPeriod::parse(period)
        .ok_or_else(|| ApiError::validation(format!("Invalid period: {period}")))?;

    let report = state
        .db
        .reports()
        .sales_report(period, query.from, query.to)
        .await?;
    Ok(Json(report))
}

async fn top_products(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<TopProduct>>, ApiError> {
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    let top = state.db.reports().top_products(limit).await?;
    Ok(Json(top))
}

async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let threshold = query.threshold.unwrap_or(10);
    let products = state.db.products().low_stock(threshold).await?;
    Ok(Json(products))
}
