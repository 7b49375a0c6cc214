//! Catalog endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use tindahan_core::validation::{validate_price_cents, validate_product_name, validate_sku};
use tindahan_core::{CoreError, Product};
use tindahan_db::repository::product::generate_product_id;

use crate::error::ApiError;
use crate::identity::Cashier;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product))
        .route("/:id/inventory", post(adjust_inventory))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: String,
    sku: String,
    price_cents: i64,
    #[serde(default)]
    inventory: i64,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
}

impl ProductBody {
    fn validate(&self) -> Result<(), ApiError> {
        validate_product_name(&self.name).map_err(CoreError::from)?;
        validate_sku(&self.sku).map_err(CoreError::from)?;
        validate_price_cents(self.price_cents).map_err(CoreError::from)?;
        if self.inventory < 0 {
            return Err(ApiError::validation("inventory must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustBody {
    /// Signed stock delta: positive restock, negative shrinkage.
    delta: i64,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_product(
    State(state): State<AppState>,
    _cashier: Cashier,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    body.validate()?;

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: body.name.trim().to_string(),
        sku: body.sku.trim().to_string(),
        image: body.image,
        price_cents: body.price_cents,
        inventory: body.inventory,
        category_id: body.category_id,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    _cashier: Cashier,
    Path(id): Path<String>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>, ApiError> {
    body.validate()?;

    let mut product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    product.name = body.name.trim().to_string();
    product.sku = body.sku.trim().to_string();
    product.image = body.image;
    product.price_cents = body.price_cents;
    product.category_id = body.category_id;

    state.db.products().update(&product).await?;

    let updated = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(updated))
}

async fn adjust_inventory(
    State(state): State<AppState>,
    _cashier: Cashier,
    Path(id): Path<String>,
    Json(body): Json<AdjustBody>,
) -> Result<Json<Product>, ApiError> {
    let product = state.db.products().adjust_inventory(&id, body.delta).await?;
    Ok(Json(product))
}
