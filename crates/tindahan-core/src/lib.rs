//! # tindahan-core: Pure Business Logic for Tindahan POS
//!
//! This crate is the heart of the system: everything with a correctness
//! invariant lives here as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  HTTP handlers (apps/server)                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ★ tindahan-core (THIS CRATE) ★                                     │
//! │                                                                     │
//! │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐         │
//! │   │  types   │  │  money   │  │ payment  │  │  checkout  │         │
//! │   │ Product  │  │  Money   │  │  parser  │  │  pricing   │         │
//! │   │  Sale    │  │ centavos │  │ buckets  │  │  coverage  │         │
//! │   └──────────┘  └──────────┘  └──────────┘  └────────────┘         │
//! │                                                                     │
//! │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  tindahan-db (SQLite repositories, transaction boundaries)          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, reconciliation records, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`payment`] - Dual-format payment-method field parser and buckets
//! - [`checkout`] - Cart pricing, stock checks, payment coverage
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input, same output
//! 2. **Integer Money**: all monetary values are centavos (i64)
//! 3. **Explicit Errors**: typed errors, never strings or panics
//! 4. **Explicit Dates**: callers pass the business day; nothing in this
//!    crate reads the wall clock

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps single receipts reviewable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
