//! # Error Types
//!
//! Domain-specific error types for threadline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  threadline-core errors (this file)                                    │
//! │  ├── CoreError        - Cart and business-rule failures                │
//! │  └── ValidationError  - One violated field rule                        │
//! │                                                                         │
//! │  threadline-client errors (separate crate)                             │
//! │  └── ClientError      - Transport, rejection, validation               │
//! │                                                                         │
//! │  Flow: ValidationError → Violations → ClientError → CLI message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Field labels are the human-readable names shown on forms
//! 3. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::validation::Violations;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock to satisfy the requested cart quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: quantityInStock=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Linen Shirt", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product is inactive or sold out.
    #[error("{0} is not available for purchase")]
    ProductUnavailable(String),

    /// Quantity must be at least one.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// Cart has reached the maximum number of distinct products.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Unknown enumerated value (role, sort key, facet, ...).
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    /// One or more form fields failed validation.
    #[error("{0}")]
    Validation(Violations),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single violated field rule.
///
/// `field` and `other` are form labels ("Selling price", "cost price"), so the
/// rendered message reads as a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field must be an exact number of digits.
    #[error("{field} must be exactly {digits} digits")]
    Digits { field: &'static str, digits: usize },

    /// National identity number in neither the old nor the new format.
    #[error("{field} must be 9 digits followed by V or X, or 12 digits")]
    NationalId { field: &'static str },

    /// Not shaped like `local@domain.tld`.
    #[error("{field} must be a valid email address")]
    Email { field: &'static str },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// Field must be strictly greater than another field.
    #[error("{field} must exceed {other}")]
    MustExceed {
        field: &'static str,
        other: &'static str,
    },

    /// Field must equal another field.
    #[error("{field} does not match {other}")]
    Mismatch {
        field: &'static str,
        other: &'static str,
    },

    /// Field must differ from another field.
    #[error("{field} must be different from {other}")]
    MustDiffer {
        field: &'static str,
        other: &'static str,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value does not fit the amounts the store can record.
    #[error("{field} is too large")]
    TooLarge { field: &'static str },

    /// Value cannot be negative.
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    /// Date is earlier than a related date.
    #[error("{field} cannot be before {other}")]
    Before {
        field: &'static str,
        other: &'static str,
    },

    /// Date lies in the future.
    #[error("{field} cannot be in the future")]
    InFuture { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<Violations> for CoreError {
    fn from(violations: Violations) -> Self {
        CoreError::Validation(violations)
    }
}
