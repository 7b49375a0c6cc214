//! HTTP route modules, one per resource. Handlers stay thin: deserialize,
//! resolve identity and the business date at the edge, call a repository,
//! serialize.

pub mod expenses;
pub mod products;
pub mod reconciliation;
pub mod reports;
pub mod starting_cash;
pub mod transactions;

use axum::Router;

use crate::state::AppState;

/// Assembles the full API surface.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/products", products::router())
        .nest("/api/transactions", transactions::router())
        .nest("/api/starting-cash", starting_cash::router())
        .nest("/api/reconciliation", reconciliation::router())
        .nest("/api/reports", reports::router())
        .nest("/api/expenses", expenses::router())
}
