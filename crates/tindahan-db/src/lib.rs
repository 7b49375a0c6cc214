//! # tindahan-db: Database Layer for Tindahan POS
//!
//! SQLite persistence via sqlx. Repositories own every transaction
//! boundary; callers never compose partial writes themselves.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale,
//!   reconciliation, expense, report)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tindahan_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tindahan.db")).await?;
//! let receipt = db.sales().checkout(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::reconciliation::ReconciliationRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
