//! # Derived-Field Calculators
//!
//! Small pure functions behind the values the screens fill in automatically.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ profit percentage    │ (selling − cost) / cost × 100, None if cost ≤ 0  │
//! │ line / cart total    │ Σ quantity × unit price                          │
//! │ stock severity       │ current / reorder level → critical..ok           │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Profit over cost, in percent, at full precision.
///
/// Returns `None` when the cost is zero or negative (nothing to divide by).
///
/// ```rust
/// use threadline_core::calc::profit_percentage;
/// use threadline_core::money::Money;
///
/// let pct = profit_percentage(Money::from_cents(10_000), Money::from_cents(12_000));
/// assert_eq!(pct, Some(20.0));
/// assert_eq!(profit_percentage(Money::zero(), Money::from_cents(500)), None);
/// ```
pub fn profit_percentage(cost: Money, selling: Money) -> Option<f64> {
    if !cost.is_positive() {
        return None;
    }
    let margin = (selling - cost).cents() as f64;
    Some(margin * 100.0 / cost.cents() as f64)
}

/// Rounds to two decimals for display. Stored values keep full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `unit_price × quantity`, saturating on overflow.
#[inline]
pub fn line_total(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// `unit_price × quantity`, or `None` when the total is out of range.
#[inline]
pub fn checked_line_total(unit_price: Money, quantity: i64) -> Option<Money> {
    unit_price.checked_multiply_quantity(quantity)
}

/// Sum of `quantity × unit price` over all lines.
pub fn grand_total<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .map(|(unit_price, quantity)| line_total(unit_price, quantity))
        .sum()
}

// =============================================================================
// Stock Severity
// =============================================================================

/// Reorder urgency of a product, most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockSeverity {
    Critical,
    Low,
    Warning,
    Ok,
}

impl StockSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockSeverity::Critical => "critical",
            StockSeverity::Low => "low",
            StockSeverity::Warning => "warning",
            StockSeverity::Ok => "ok",
        }
    }

    /// Whether the merchandise manager should be notified.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, StockSeverity::Ok)
    }
}

impl fmt::Display for StockSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets `current / reorder_level`.
///
/// ```text
///   ratio ≤ 0.25  → critical
///   ratio ≤ 0.50  → low
///   ratio ≤ 1.00  → warning
///   otherwise     → ok
/// ```
///
/// Without a positive reorder level there is no threshold: empty stock is
/// still critical, anything else is ok.
pub fn stock_severity(current: i64, reorder_level: i64) -> StockSeverity {
    if reorder_level <= 0 {
        return if current <= 0 {
            StockSeverity::Critical
        } else {
            StockSeverity::Ok
        };
    }

    let ratio = current as f64 / reorder_level as f64;
    if ratio <= 0.25 {
        StockSeverity::Critical
    } else if ratio <= 0.50 {
        StockSeverity::Low
    } else if ratio <= 1.00 {
        StockSeverity::Warning
    } else {
        StockSeverity::Ok
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
