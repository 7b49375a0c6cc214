//! # Error Types
//!
//! Domain-specific error types for tindahan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  tindahan-core errors (this file)                                   │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  tindahan-db errors (separate crate)                                │
//! │  └── DbError          - Store failures, wraps CoreError for units   │
//! │                         of work that validate inside a transaction  │
//! │                                                                     │
//! │  apps/server                                                        │
//! │  └── ApiError         - code + message, mapped to HTTP status       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts, date)
//! 3. Errors are enum variants, never String

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant carries enough detail for the UI to prompt a correction;
/// none of them leaks store internals.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Requested quantity exceeds current stock at validation time.
    ///
    /// ## When This Occurs
    /// - A cart line asks for more than the shelf holds
    /// - Two checkouts race the same product and one loses the guarded
    ///   decrement
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Declared split payments do not cover the computed total.
    #[error("Payment insufficient: tendered {paid_cents} against total {total_cents}")]
    PaymentInsufficient { paid_cents: i64, total_cents: i64 },

    /// A close operation targets a date that is already reconciled.
    #[error("Day {date} has already been closed")]
    AlreadyClosed { date: NaiveDate },

    /// A required numeric field is missing, non-numeric, or out of range.
    ///
    /// Rejected before any persistence happens.
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad SKU characters, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Coke 330ml".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coke 330ml: available 3, requested 5"
        );

        let err = CoreError::PaymentInsufficient {
            paid_cents: 45000,
            total_cents: 50000,
        };
        assert_eq!(
            err.to_string(),
            "Payment insufficient: tendered 45000 against total 50000"
        );
    }

    #[test]
    fn test_already_closed_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let err = CoreError::AlreadyClosed { date };
        assert_eq!(err.to_string(), "Day 2026-08-05 has already been closed");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
