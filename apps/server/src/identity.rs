//! # Caller Identity
//!
//! The authentication middleware (JWT verification, role checks) is an
//! external collaborator deployed in front of this service; by the time a
//! request arrives here it carries the verified cashier id in the
//! `x-cashier-id` header. This extractor lifts that into an explicit value
//! threaded into core operations - identity is never ambient state, and
//! never read from request bodies.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The acting cashier, resolved per request.
#[derive(Debug, Clone)]
pub struct Cashier {
    pub id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Cashier
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-cashier-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Cashier { id: s.to_string() })
            .ok_or_else(|| ApiError::unauthorized("Missing cashier identity"))
    }
}
