//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! Every domain failure maps to a machine-readable code plus a
//! human-readable message with enough detail to prompt a correction
//! (product name, amounts, date). Store failures are logged server-side
//! and returned as a generic message - internals never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tindahan_core::CoreError;
use tindahan_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Requested quantity exceeds current stock (409)
    InsufficientStock,

    /// Declared payments don't cover the total (400)
    PaymentInsufficient,

    /// The date has already been reconciled (409)
    AlreadyClosed,

    /// Missing or malformed numeric field (400)
    InvalidAmount,

    /// Missing caller identity (401)
    Unauthorized,

    /// Store failure (500)
    DatabaseError,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PaymentInsufficient => StatusCode::BAD_REQUEST,
            ErrorCode::AlreadyClosed => StatusCode::CONFLICT,
            ErrorCode::InvalidAmount => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts core errors to API errors. The error Display strings already
/// carry the identifying detail.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::PaymentInsufficient { .. } => ErrorCode::PaymentInsufficient,
            CoreError::AlreadyClosed { .. } => ErrorCode::AlreadyClosed,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value: _ } => {
                ApiError::validation(format!("{field} already exists"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            other => {
                // Log the real failure, return a generic message.
                tracing::error!("Database error: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let err = ApiError::from(CoreError::InsufficientStock {
            name: "Coke".to_string(),
            available: 1,
            requested: 2,
        });
        assert!(matches!(err.code, ErrorCode::InsufficientStock));
        assert!(err.message.contains("Coke"));

        let err = ApiError::from(DbError::Domain(CoreError::PaymentInsufficient {
            paid_cents: 45000,
            total_cents: 50000,
        }));
        assert!(matches!(err.code, ErrorCode::PaymentInsufficient));
    }

    #[test]
    fn test_store_errors_stay_generic() {
        let err = ApiError::from(DbError::QueryFailed("secret table detail".to_string()));
        assert!(!err.message.contains("secret"));
    }
}
