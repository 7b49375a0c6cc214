//! # Domain Types
//!
//! Core domain types used throughout Tindahan POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌──────────────────────┐  │
//! │  │    Product    │   │     Sale      │   │     SaleLineItem     │  │
//! │  │  ───────────  │   │  ───────────  │   │  ──────────────────  │  │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)           │  │
//! │  │  sku (unique) │   │  total_cents  │   │  sale_id (FK)        │  │
//! │  │  price_cents  │   │  mop (dual)   │   │  unit_price_cents    │  │
//! │  │  inventory    │   │  cashier_id   │   │  (frozen at sale)    │  │
//! │  └───────────────┘   └───────────────┘   └──────────────────────┘  │
//! │                                                                     │
//! │  ┌───────────────┐   ┌────────────────────────┐   ┌─────────────┐  │
//! │  │   CashFloat   │   │  DailyReconciliation   │   │   Expense   │  │
//! │  │  one per day  │   │  one per day, frozen   │   │  day log    │  │
//! │  └───────────────┘   └────────────────────────┘   └─────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All monetary fields are integer centavos; accessor methods return
//! [`Money`] for arithmetic. Timestamps are UTC; business days are
//! `NaiveDate` keys supplied by the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    /// Optional image path (upload handling lives outside this system).
    pub image: Option<String>,

    /// Unit price in centavos.
    pub price_cents: i64,

    /// Current stock level. Never negative.
    pub inventory: i64,

    /// Category reference. Category management is a plain CRUD concern
    /// handled elsewhere.
    pub category_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity can currently be fulfilled.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.inventory >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
///
/// `mop` holds the raw mode-of-payment field: either a plain method name
/// (legacy rows) or a JSON array of `{method, amount}` pairs. It is decoded
/// exactly once by [`crate::payment::parse_payment_methods`]; nothing else
/// inspects the raw text.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Total in centavos: sum of line subtotals minus the discount.
    pub total_cents: i64,

    /// Absolute discount in centavos applied at checkout.
    pub discount_cents: i64,

    /// Raw payment-method field (dual encoding, see type docs).
    pub mop: String,

    /// The cashier who rang the sale, from the caller's identity context.
    pub cashier_id: String,

    /// Free-text customer name, may be empty.
    pub customer_name: Option<String>,

    /// Creation timestamp. Immutable - sales are never backdated, and
    /// edits do not touch it.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// One product-quantity-price record belonging to a sale.
///
/// Uses the snapshot pattern: the unit price is copied from the product at
/// checkout time and must not change retroactively when the catalog price
/// does. Lifecycle is tied 1:1 to the parent sale's item set.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price, in centavos.
    pub subtotal_cents: i64,
}

impl SaleLineItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Cash Float
// =============================================================================

/// The declared opening cash amount for one trading day.
///
/// Keyed by calendar date with upsert semantics: re-declaring the float for
/// the same day overwrites the previous amount (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashFloat {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashFloat {
    /// Returns the float amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Daily Reconciliation
// =============================================================================

/// The end-of-day close record: expected vs counted cash for one date.
///
/// At most one row per calendar date, enforced by a uniqueness constraint.
/// Immutable once written; closing the same date twice must fail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyReconciliation {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Snapshot of the day's declared starting cash.
    pub starting_cash_cents: i64,
    /// starting cash + the day's cash-method sales.
    pub expected_cash_cents: i64,
    /// Counted cash entered by the closing operator.
    pub actual_cash_cents: i64,
    /// actual − expected. Negative means the drawer came up short.
    pub cash_difference_cents: i64,
    pub cash_sales_cents: i64,
    pub non_cash_sales_cents: i64,
    /// Total of expenses logged during the day, recorded for the report.
    pub expense_total_cents: i64,
    pub transaction_count: i64,
    pub notes: Option<String>,
    /// The operator who closed the day.
    pub closed_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DailyReconciliation {
    /// Returns the signed cash variance as Money.
    #[inline]
    pub fn difference(&self) -> Money {
        Money::from_cents(self.cash_difference_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A logged business expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub amount_cents: i64,
    /// Expense kind label (free-form; kind management is external CRUD).
    pub kind: String,
    pub location: String,
    pub notes: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
