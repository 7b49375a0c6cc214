//! Checkout and transaction endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tindahan_core::checkout::CartLine;
use tindahan_core::payment::PaymentEntry;
use tindahan_core::{Sale, SaleLineItem};
use tindahan_db::repository::sale::{CheckoutRequest, SaleFilter};

use crate::error::ApiError;
use crate::identity::Cashier;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction).get(list_transactions))
        .route("/:id", get(get_transaction).put(edit_transaction))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    items: Vec<CartLine>,
    /// Absolute discount in centavos, defaults to zero.
    #[serde(default)]
    discount_cents: i64,
    /// Raw payment description: a method name or a JSON array of split
    /// payments, exactly as the register UI submits it.
    mop: String,
    #[serde(default)]
    customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    sale_id: String,
    total_cents: i64,
    payment_breakdown: Vec<PaymentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditBody {
    items: Vec<CartLine>,
    mop: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    cashier_id: Option<String>,
    start_date: Option<NaiveDate>,
    /// Inclusive end date.
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionDetail {
    sale: Sale,
    items: Vec<SaleLineItem>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_transaction(
    State(state): State<AppState>,
    cashier: Cashier,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    debug!(cashier = %cashier.id, lines = body.items.len(), "checkout request");

    let receipt = state
        .db
        .sales()
        .checkout(&CheckoutRequest {
            cart: body.items,
            discount_cents: body.discount_cents,
            payment: body.mop,
            customer_name: body.customer_name,
            cashier_id: cashier.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            sale_id: receipt.sale_id,
            total_cents: receipt.total_cents,
            payment_breakdown: receipt.payment_breakdown,
        }),
    ))
}

async fn edit_transaction(
    State(state): State<AppState>,
    _cashier: Cashier,
    Path(id): Path<String>,
    Json(body): Json<EditBody>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let receipt = state
        .db
        .sales()
        .replace_items(&id, &body.items, &body.mop)
        .await?;

    Ok(Json(CheckoutResponse {
        sale_id: receipt.sale_id,
        total_cents: receipt.total_cents,
        payment_breakdown: receipt.payment_breakdown,
    }))
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let filter = SaleFilter {
        cashier_id: query.cashier_id,
        start: query
            .start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        end: query
            .end_date
            .map(|d| (d + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()),
    };

    let sales = state.db.sales().list(&filter).await?;
    Ok(Json(sales))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDetail>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;
    let items = state.db.sales().get_items(&id).await?;

    Ok(Json(TransactionDetail { sale, items }))
}
