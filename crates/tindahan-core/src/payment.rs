//! # Payment-Method Field Parser
//!
//! Normalizes the `mop` field stored on every sale, which carries two
//! encodings that must both stay readable forever:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  LEGACY rows:   mop = "Cash"                                        │
//! │                 one payment, amount implied by the sale total       │
//! │                                                                     │
//! │  CURRENT rows:  mop = [{"method":"Cash","amount":300},              │
//! │                        {"method":"GCash","amount":200}]             │
//! │                 split tender, amounts in decimal major units        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Historical rows are never migrated, so the raw field is decoded exactly
//! once here - into [`PaymentEntry`] values with amounts in centavos - and
//! never re-inspected as text anywhere else. Parsing never fails: anything
//! that isn't a non-empty JSON array degrades to the legacy single-method
//! interpretation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Parsed Entries
// =============================================================================

/// One method/amount pair decoded from a sale's payment field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentEntry {
    /// Method name as stored ("Cash", "GCash", ...). Matching is always
    /// case-insensitive.
    pub method: String,

    /// Amount in centavos. `None` means "equal to the sale total" (legacy
    /// rows); callers resolve it against a concrete total when they need a
    /// figure.
    pub amount_cents: Option<i64>,
}

impl PaymentEntry {
    /// Resolves the entry's amount against the sale total.
    #[inline]
    pub fn resolved_amount(&self, total: Money) -> Money {
        self.amount_cents.map(Money::from_cents).unwrap_or(total)
    }

    /// Whether this entry is a cash payment.
    #[inline]
    pub fn is_cash(&self) -> bool {
        self.method.eq_ignore_ascii_case("cash")
    }
}

/// Wire shape of one element in the JSON-array encoding. Amounts are decimal
/// major units; missing or null fields are tolerated the way the historical
/// data requires.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses the raw payment field into normalized entries.
///
/// - Valid JSON decoding to a non-empty array: each element becomes an
///   entry, amounts converted major units → centavos, missing method → "".
/// - Anything else: the whole field is one legacy payment of unknown split,
///   `[{method: raw, amount: None}]`.
/// - Blank input yields no entries at all.
///
/// Never fails.
pub fn parse_payment_methods(raw: &str) -> Vec<PaymentEntry> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    if let Ok(entries) = serde_json::from_str::<Vec<RawEntry>>(raw) {
        if !entries.is_empty() {
            return entries
                .into_iter()
                .map(|e| PaymentEntry {
                    method: e.method.unwrap_or_default(),
                    amount_cents: e.amount.map(|a| Money::from_major_units(a).cents()),
                })
                .collect();
        }
    }

    vec![PaymentEntry {
        method: raw.to_string(),
        amount_cents: None,
    }]
}

/// Re-serializes split payments into the canonical stored encoding.
///
/// Amounts are written in major units - whole numbers stay integers so the
/// output matches what the historical frontend wrote. `parse ∘ encode` is
/// idempotent.
pub fn encode_split(parts: &[SplitPayment]) -> String {
    let arr: Vec<serde_json::Value> = parts
        .iter()
        .map(|p| {
            serde_json::json!({
                "method": p.method,
                "amount": major_units_value(p.amount_cents),
            })
        })
        .collect();
    serde_json::to_string(&arr).unwrap_or_default()
}

fn major_units_value(cents: i64) -> serde_json::Value {
    if cents % 100 == 0 {
        serde_json::Value::from(cents / 100)
    } else {
        serde_json::Value::from(cents as f64 / 100.0)
    }
}

// =============================================================================
// Method Buckets
// =============================================================================

/// Per-method sales totals, bucketed by case-insensitive method name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MethodTotals {
    pub cash_cents: i64,
    pub gcash_cents: i64,
    pub card_cents: i64,
    pub paymaya_cents: i64,
    pub bank_transfer_cents: i64,
    pub other_cents: i64,
}

impl MethodTotals {
    /// Folds one sale's payment field into the totals.
    ///
    /// Entries without a concrete amount count as the full sale total,
    /// matching how legacy single-method rows are interpreted.
    pub fn accumulate(&mut self, mop: &str, total: Money) {
        for entry in parse_payment_methods(mop) {
            let amount = entry.resolved_amount(total).cents();
            match entry.method.to_lowercase().as_str() {
                "cash" => self.cash_cents += amount,
                "gcash" => self.gcash_cents += amount,
                "card" => self.card_cents += amount,
                "paymaya" => self.paymaya_cents += amount,
                "bank transfer" => self.bank_transfer_cents += amount,
                _ => self.other_cents += amount,
            }
        }
    }
}

/// Whether any payment entry on the sale is cash.
pub fn has_cash_component(mop: &str) -> bool {
    parse_payment_methods(mop).iter().any(PaymentEntry::is_cash)
}

/// The cash portion of a sale, in centavos.
pub fn cash_amount(mop: &str, total: Money) -> Money {
    parse_payment_methods(mop)
        .iter()
        .filter(|e| e.is_cash())
        .fold(Money::zero(), |acc, e| acc + e.resolved_amount(total))
}

/// The non-cash remainder of a sale: total minus the cash portion.
///
/// Can go negative when recorded cash entries exceed the sale total; the
/// reconciliation report shows that as-is rather than hiding it.
pub fn non_cash_amount(mop: &str, total: Money) -> Money {
    total - cash_amount(mop, total)
}

// =============================================================================
// Checkout-Side Payment Plans
// =============================================================================

/// A validated payment description, ready to persist.
///
/// The raw description a checkout receives is either a single legacy method
/// string or a JSON array of split payments; this tagged union is the one
/// place that distinction is decided.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPlan {
    /// One method covering the full total implicitly. No sum check.
    Legacy(String),
    /// Split tender with concrete, validated amounts.
    Split(Vec<SplitPayment>),
}

/// One validated split-tender part. Unlike [`PaymentEntry`], the amount is
/// always concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPayment {
    pub method: String,
    pub amount_cents: i64,
}

impl PaymentPlan {
    /// Classifies and validates a payment description against a sale total.
    ///
    /// Split form rules:
    /// - every entry needs a non-empty method
    /// - every entry needs a strictly positive amount
    /// - the amounts must sum to at least the total, else
    ///   [`CoreError::PaymentInsufficient`]
    ///
    /// A description that does not parse as a non-empty JSON array falls
    /// back to the legacy single-method form, which carries implicit
    /// full-total coverage and is not sum-checked.
    pub fn validate(raw: &str, total: Money) -> CoreResult<PaymentPlan> {
        let entries = match serde_json::from_str::<Vec<RawEntry>>(raw) {
            Ok(entries) if !entries.is_empty() => entries,
            _ => return Ok(PaymentPlan::Legacy(raw.to_string())),
        };

        let mut parts = Vec::with_capacity(entries.len());
        for entry in entries {
            let method = entry.method.unwrap_or_default();
            if method.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "payment method".to_string(),
                }
                .into());
            }

            let amount = match entry.amount {
                Some(a) if a > 0.0 => Money::from_major_units(a),
                Some(_) => {
                    return Err(CoreError::invalid_amount(
                        "payment amount",
                        format!("must be positive for {method}"),
                    ))
                }
                None => {
                    return Err(CoreError::invalid_amount(
                        "payment amount",
                        format!("missing for {method}"),
                    ))
                }
            };

            parts.push(SplitPayment {
                method,
                amount_cents: amount.cents(),
            });
        }

        let paid: i64 = parts.iter().map(|p| p.amount_cents).sum();
        if paid < total.cents() {
            return Err(CoreError::PaymentInsufficient {
                paid_cents: paid,
                total_cents: total.cents(),
            });
        }

        Ok(PaymentPlan::Split(parts))
    }

    /// The canonical value to store in the sale's payment field.
    pub fn stored_field(&self) -> String {
        match self {
            PaymentPlan::Legacy(method) => method.clone(),
            PaymentPlan::Split(parts) => encode_split(parts),
        }
    }

    /// The normalized breakdown returned to the caller after checkout.
    pub fn breakdown(&self, total: Money) -> Vec<PaymentEntry> {
        match self {
            PaymentPlan::Legacy(method) => vec![PaymentEntry {
                method: method.clone(),
                amount_cents: Some(total.cents()),
            }],
            PaymentPlan::Split(parts) => parts
                .iter()
                .map(|p| PaymentEntry {
                    method: p.method.clone(),
                    amount_cents: Some(p.amount_cents),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_string_parses_to_single_entry() {
        let entries = parse_payment_methods("Cash");
        assert_eq!(
            entries,
            vec![PaymentEntry {
                method: "Cash".to_string(),
                amount_cents: None,
            }]
        );
    }

    #[test]
    fn test_split_json_parses_with_major_unit_amounts() {
        let entries =
            parse_payment_methods(r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":200.50}]"#);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].method, "Cash");
        assert_eq!(entries[0].amount_cents, Some(30000));
        assert_eq!(entries[1].amount_cents, Some(20050));
    }

    #[test]
    fn test_garbage_degrades_to_legacy() {
        let entries = parse_payment_methods("{not json");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].method, "{not json");
        assert_eq!(entries[0].amount_cents, None);

        // An empty JSON array is not a usable split; same fallback.
        let entries = parse_payment_methods("[]");
        assert_eq!(entries[0].method, "[]");
    }

    #[test]
    fn test_blank_field_has_no_entries() {
        assert!(parse_payment_methods("").is_empty());
        assert!(parse_payment_methods("   ").is_empty());
    }

    #[test]
    fn test_parse_is_idempotent_over_encode() {
        let parts = vec![
            SplitPayment {
                method: "Cash".to_string(),
                amount_cents: 30000,
            },
            SplitPayment {
                method: "GCash".to_string(),
                amount_cents: 20050,
            },
        ];
        let encoded = encode_split(&parts);
        let parsed = parse_payment_methods(&encoded);
        let reencoded = encode_split(
            &parsed
                .iter()
                .map(|e| SplitPayment {
                    method: e.method.clone(),
                    amount_cents: e.amount_cents.unwrap(),
                })
                .collect::<Vec<_>>(),
        );
        assert_eq!(encoded, reencoded);
        assert_eq!(parsed[0].amount_cents, Some(30000));
        assert_eq!(parsed[1].amount_cents, Some(20050));
    }

    #[test]
    fn test_cash_amount_resolves_legacy_to_total() {
        // A legacy "Cash" sale with total 250 is worth 250 in cash.
        let total = Money::from_cents(25000);
        assert_eq!(cash_amount("Cash", total).cents(), 25000);
        assert_eq!(non_cash_amount("Cash", total).cents(), 0);
        assert!(has_cash_component("cash"));
        assert!(!has_cash_component("GCash"));
    }

    #[test]
    fn test_cash_amount_from_split() {
        let total = Money::from_cents(50000);
        let mop = r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":200}]"#;
        assert_eq!(cash_amount(mop, total).cents(), 30000);
        assert_eq!(non_cash_amount(mop, total).cents(), 20000);
        assert!(has_cash_component(mop));
    }

    #[test]
    fn test_method_totals_bucketing() {
        let mut totals = MethodTotals::default();
        totals.accumulate("Cash", Money::from_cents(10000));
        totals.accumulate("GCASH", Money::from_cents(5000));
        totals.accumulate("Bank Transfer", Money::from_cents(2500));
        totals.accumulate("store credit", Money::from_cents(100));
        totals.accumulate(
            r#"[{"method":"Cash","amount":20},{"method":"PayMaya","amount":30}]"#,
            Money::from_cents(5000),
        );

        assert_eq!(totals.cash_cents, 12000);
        assert_eq!(totals.gcash_cents, 5000);
        assert_eq!(totals.bank_transfer_cents, 2500);
        assert_eq!(totals.paymaya_cents, 3000);
        assert_eq!(totals.other_cents, 100);
        assert_eq!(totals.card_cents, 0);
    }

    #[test]
    fn test_plan_legacy_fallback() {
        let plan = PaymentPlan::validate("Cash", Money::from_cents(25000)).unwrap();
        assert_eq!(plan, PaymentPlan::Legacy("Cash".to_string()));
        assert_eq!(plan.stored_field(), "Cash");
        let breakdown = plan.breakdown(Money::from_cents(25000));
        assert_eq!(breakdown[0].amount_cents, Some(25000));
    }

    #[test]
    fn test_plan_split_covers_total() {
        let raw = r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":200}]"#;
        let plan = PaymentPlan::validate(raw, Money::from_cents(50000)).unwrap();
        match &plan {
            PaymentPlan::Split(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].amount_cents, 30000);
            }
            other => panic!("expected split plan, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_split_under_total_is_insufficient() {
        let raw = r#"[{"method":"Cash","amount":300},{"method":"GCash","amount":150}]"#;
        let err = PaymentPlan::validate(raw, Money::from_cents(50000)).unwrap_err();
        match err {
            CoreError::PaymentInsufficient {
                paid_cents,
                total_cents,
            } => {
                assert_eq!(paid_cents, 45000);
                assert_eq!(total_cents, 50000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_split_rejects_bad_entries() {
        let missing_amount = r#"[{"method":"Cash"}]"#;
        assert!(matches!(
            PaymentPlan::validate(missing_amount, Money::from_cents(100)),
            Err(CoreError::InvalidAmount { .. })
        ));

        let zero_amount = r#"[{"method":"Cash","amount":0}]"#;
        assert!(matches!(
            PaymentPlan::validate(zero_amount, Money::from_cents(100)),
            Err(CoreError::InvalidAmount { .. })
        ));

        let no_method = r#"[{"amount":100}]"#;
        assert!(matches!(
            PaymentPlan::validate(no_method, Money::from_cents(100)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_overpayment_is_allowed() {
        // Cash tendered above the total is change, not an error.
        let raw = r#"[{"method":"Cash","amount":600}]"#;
        assert!(PaymentPlan::validate(raw, Money::from_cents(50000)).is_ok());
    }
}
