//! # threadline-core: Pure Business Logic for Threadline
//!
//! Everything the back office and storefront compute locally lives here as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Threadline Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              apps/backoffice (role dashboards)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     threadline-client (REST resources, CRUD controller)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ threadline-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ entities │ │  query   │ │   calc   │ │    validation    │  │   │
//! │  │   │ records  │ │ filter + │ │ profit % │ │ mobile, NIC, zip │  │   │
//! │  │   │ + forms  │ │ sort     │ │ severity │ │ email, prices    │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Shared references, roles, users and dashboard screens
//! - [`entities`] - One module per managed entity (record, form, listing)
//! - [`money`] - Money type with integer arithmetic
//! - [`query`] - Client-side filter/sort engine
//! - [`validation`] - Field rules and the violation collector
//! - [`calc`] - Profit percentage, totals, stock severity
//! - [`cart`] - Storefront cart
//! - [`schema`] - Entity descriptors that drive the generic CRUD screens
//! - [`numbering`] - Human-readable entity numbers
//!
//! ## Example Usage
//!
//! ```rust
//! use threadline_core::calc::profit_percentage;
//! use threadline_core::money::Money;
//!
//! let cost = Money::from_cents(10_000);
//! let selling = Money::from_cents(15_000);
//! assert_eq!(profit_percentage(cost, selling), Some(50.0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calc;
pub mod cart;
pub mod entities;
pub mod error;
pub mod money;
pub mod numbering;
pub mod query;
pub mod schema;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use query::{Direction, ListQuery, Listable, Sort};
pub use schema::EntitySchema;
pub use types::*;
pub use validation::Violations;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Minimum length of a new account password.
pub const MIN_PASSWORD_LEN: usize = 8;
