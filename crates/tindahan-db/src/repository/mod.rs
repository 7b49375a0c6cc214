//! # Repository Module
//!
//! Database repository implementations for Tindahan POS.
//!
//! Each repository wraps the shared pool and exposes a typed API; SQL never
//! leaks out of this module. The multi-step units of work (checkout,
//! transaction edit, day close) open their transaction here and either
//! commit everything or roll everything back.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and inventory adjustment
//! - [`sale::SaleRepository`] - Checkout and transaction edits
//! - [`reconciliation::ReconciliationRepository`] - Cash floats and day close
//! - [`expense::ExpenseRepository`] - Expense log
//! - [`report::ReportRepository`] - Read-only sales aggregation

pub mod expense;
pub mod product;
pub mod reconciliation;
pub mod report;
pub mod sale;
