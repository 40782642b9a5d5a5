//! # Validation Module
//!
//! Field rules for every entity form, evaluated before any request is sent.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form rules (THIS MODULE)                                     │
//! │  ├── Required fields, digit patterns, email shape                      │
//! │  ├── Cross-field rules (selling > cost, password confirmation)         │
//! │  └── ALL violations collected, not just the first                      │
//! │           │                                                             │
//! │           ▼ (only when empty)                                          │
//! │  Layer 2: REST backend                                                 │
//! │  ├── Uniqueness (duplicate NIC, username)                              │
//! │  └── Rejections forwarded verbatim to the form                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use threadline_core::validation::{is_mobile_number, is_nic, Violations};
//!
//! assert!(is_mobile_number("0771234567"));
//! assert!(is_nic("123456789V"));
//!
//! let mut v = Violations::new();
//! v.mobile_number("Mobile number", "12345");
//! assert_eq!(v.joined(), "Mobile number must be exactly 10 digits");
//! ```

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Patterns
// =============================================================================

static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("valid regex"));
static NIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{9}[xXvV]|[0-9]{12})$").expect("valid regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Exactly 10 digits (mobile and supplier/provider contact numbers).
pub fn is_mobile_number(value: &str) -> bool {
    MOBILE_RE.is_match(value.trim())
}

/// Exactly 5 digits.
pub fn is_zip_code(value: &str) -> bool {
    ZIP_RE.is_match(value.trim())
}

/// National identity number: 9 digits followed by one of `x X v V`, or 12 digits.
pub fn is_nic(value: &str) -> bool {
    NIC_RE.is_match(value.trim())
}

/// `local@domain.tld` shape.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

// =============================================================================
// Violations
// =============================================================================

/// Ordered collection of violated rules for one form submission.
///
/// Every rule runs independently; the caller decides what to do with the full
/// list (usually `joined()` for display).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<ValidationError>);

impl Violations {
    pub fn new() -> Self {
        Violations(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Human-readable messages in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Messages joined for a single-line form banner.
    pub fn joined(&self) -> String {
        self.messages().join("; ")
    }

    /// `Ok(())` when nothing was violated.
    pub fn into_result(self) -> Result<(), Violations> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    // =========================================================================
    // Rule helpers
    // =========================================================================

    /// Trimmed value must be non-empty. Returns whether the value is present so
    /// pattern rules can skip blank input instead of reporting it twice.
    pub fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(ValidationError::Required { field });
            false
        } else {
            true
        }
    }

    /// Optional reference (category, status, ...) must be chosen.
    pub fn selected<T>(&mut self, field: &'static str, value: &Option<T>) {
        if value.is_none() {
            self.push(ValidationError::Required { field });
        }
    }

    pub fn mobile_number(&mut self, field: &'static str, value: &str) {
        if self.required(field, value) && !is_mobile_number(value) {
            self.push(ValidationError::Digits { field, digits: 10 });
        }
    }

    pub fn zip_code(&mut self, field: &'static str, value: &str) {
        if self.required(field, value) && !is_zip_code(value) {
            self.push(ValidationError::Digits { field, digits: 5 });
        }
    }

    pub fn nic(&mut self, field: &'static str, value: &str) {
        if self.required(field, value) && !is_nic(value) {
            self.push(ValidationError::NationalId { field });
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        if self.required(field, value) && !is_email(value) {
            self.push(ValidationError::Email { field });
        }
    }

    /// Email that may be left blank, but must be well formed when given.
    pub fn optional_email(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            if !is_email(value) {
                self.push(ValidationError::Email { field });
            }
        }
    }

    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize) {
        if self.required(field, value) && value.chars().count() < min {
            self.push(ValidationError::TooShort { field, min });
        }
    }

    pub fn non_negative(&mut self, field: &'static str, value: i64) {
        if value < 0 {
            self.push(ValidationError::Negative { field });
        }
    }

    pub fn positive_quantity(&mut self, field: &'static str, value: i64) {
        if value <= 0 {
            self.push(ValidationError::MustBePositive { field });
        }
    }

    pub fn positive_amount(&mut self, field: &'static str, value: Money) {
        if !value.is_positive() {
            self.push(ValidationError::MustBePositive { field });
        }
    }

    /// `unit_price × quantity` must be representable.
    pub fn line_total(&mut self, field: &'static str, unit_price: Money, quantity: i64) {
        if crate::calc::checked_line_total(unit_price, quantity).is_none() {
            self.push(ValidationError::TooLarge { field });
        }
    }

    /// `high` must be strictly greater than `low` (selling price vs cost price).
    pub fn exceeds(
        &mut self,
        field: &'static str,
        high: Money,
        other: &'static str,
        low: Money,
    ) {
        if high <= low {
            self.push(ValidationError::MustExceed { field, other });
        }
    }

    /// Password change: new differs from current and matches its confirmation.
    pub fn password_change(&mut self, current: &str, new: &str, confirm: &str) {
        self.required("Current password", current);
        self.min_len("New password", new, crate::MIN_PASSWORD_LEN);
        if !new.is_empty() && new == current {
            self.push(ValidationError::MustDiffer {
                field: "New password",
                other: "current password",
            });
        }
        if new != confirm {
            self.push(ValidationError::Mismatch {
                field: "Password confirmation",
                other: "new password",
            });
        }
    }

    /// `later` may not fall before `earlier` when both are set.
    pub fn not_before(
        &mut self,
        field: &'static str,
        later: Option<NaiveDate>,
        other: &'static str,
        earlier: Option<NaiveDate>,
    ) {
        if let (Some(later), Some(earlier)) = (later, earlier) {
            if later < earlier {
                self.push(ValidationError::Before { field, other });
            }
        }
    }

    pub fn not_in_future(&mut self, field: &'static str, date: Option<NaiveDate>, today: NaiveDate) {
        if matches!(date, Some(d) if d > today) {
            self.push(ValidationError::InFuture { field });
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl Serialize for Violations {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.messages())
    }
}

impl From<ValidationError> for Violations {
    fn from(error: ValidationError) -> Self {
        Violations(vec![error])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number() {
        assert!(is_mobile_number("0771234567"));
        assert!(!is_mobile_number("12345"));
        assert!(!is_mobile_number("07712345678"));
        assert!(!is_mobile_number("077123456a"));
        assert!(!is_mobile_number("٠٧٧١٢٣٤٥٦٧"));
    }

    #[test]
    fn test_nic() {
        assert!(is_nic("123456789V"));
        assert!(is_nic("123456789x"));
        assert!(is_nic("200012345678"));
        assert!(!is_nic("123456789"));
        assert!(!is_nic("123456789A"));
        assert!(!is_nic("12345678901"));
    }

    #[test]
    fn test_zip_and_email() {
        assert!(is_zip_code("10115"));
        assert!(!is_zip_code("1011"));
        assert!(is_email("nimal@example.lk"));
        assert!(!is_email("nimal@example"));
        assert!(!is_email("nimal example.lk"));
    }

    #[test]
    fn test_collects_every_violation_in_order() {
        let mut v = Violations::new();
        v.required("Full name", "   ");
        v.mobile_number("Mobile number", "12345");
        v.nic("NIC number", "123456789");
        v.zip_code("Zip code", "");

        assert_eq!(
            v.messages(),
            vec![
                "Full name is required",
                "Mobile number must be exactly 10 digits",
                "NIC number must be 9 digits followed by V or X, or 12 digits",
                "Zip code is required",
            ]
        );
        assert!(v.into_result().is_err());
    }

    #[test]
    fn test_password_change_rules() {
        let mut v = Violations::new();
        v.password_change("secret123", "secret123", "secret124");
        assert_eq!(
            v.messages(),
            vec![
                "New password must be different from current password",
                "Password confirmation does not match new password",
            ]
        );

        let mut ok = Violations::new();
        ok.password_change("secret123", "n3w-secret", "n3w-secret");
        assert!(ok.is_empty());
    }

    #[test]
    fn test_selling_price_must_exceed_cost() {
        let mut v = Violations::new();
        v.exceeds(
            "Selling price",
            Money::from_cents(9000),
            "cost price",
            Money::from_cents(10000),
        );
        assert_eq!(v.joined(), "Selling price must exceed cost price");
    }

    #[test]
    fn test_dates() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let mut v = Violations::new();
        v.not_before("Expected delivery date", d("2024-04-01"), "shipped date", d("2024-04-03"));
        v.not_in_future("Date of birth", d("2030-01-01"), today);
        assert_eq!(v.len(), 2);

        let mut ok = Violations::new();
        ok.not_before("Expected delivery date", None, "shipped date", d("2024-04-03"));
        ok.not_in_future("Date of birth", d("1990-01-01"), today);
        assert!(ok.is_empty());
    }
}
