//! # Managed Entities
//!
//! One module per REST resource. Each module carries:
//!
//! ```text
//! ┌────────────────┬────────────────────────────────────────────────────────┐
//! │ Record         │ row as returned by GET (resolved lookups via `Named`)  │
//! │ Form           │ POST/PUT body (lookups as `Ref { id }`)                │
//! │ Facet, SortKey │ what the list screen can filter and order by           │
//! │ *Schema        │ `EntitySchema` descriptor for the CRUD controller      │
//! └────────────────┴────────────────────────────────────────────────────────┘
//! ```
//!
//! Categories, provinces and statuses are plain [`Named`] lookups served by
//! read-only endpoints; see [`LookupKind`].

pub mod customer;
pub mod delivery;
pub mod employee;
pub mod order;
pub mod product;
pub mod supplier;
pub mod supplier_payment;

pub use customer::{Customer, CustomerForm, CustomerSchema, RegistrationForm};
pub use delivery::{
    Delivery, DeliveryForm, DeliveryProvider, DeliveryProviderForm, DeliveryProviderSchema,
    DeliverySchema,
};
pub use employee::{Employee, EmployeeForm, EmployeeSchema};
pub use order::{Order, OrderForm, OrderSchema};
pub use product::{Product, ProductForm, ProductSchema};
pub use supplier::{Supplier, SupplierForm, SupplierSchema};
pub use supplier_payment::{SupplierPayment, SupplierPaymentForm, SupplierPaymentSchema};

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Named;

/// Read-only lookup tables used to fill form dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Categories,
    Provinces,
    Statuses,
    OrderStatuses,
}

impl LookupKind {
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Categories,
        LookupKind::Provinces,
        LookupKind::Statuses,
        LookupKind::OrderStatuses,
    ];

    /// Collection path segment.
    pub fn resource(&self) -> &'static str {
        match self {
            LookupKind::Categories => "categories",
            LookupKind::Provinces => "provinces",
            LookupKind::Statuses => "statuses",
            LookupKind::OrderStatuses => "order-statuses",
        }
    }
}

impl FromStr for LookupKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        LookupKind::ALL
            .into_iter()
            .find(|kind| kind.resource() == normalized)
            .ok_or_else(|| unknown("lookup", s))
    }
}

/// Order status a freshly placed storefront order starts in.
pub const ORDER_STATUS_PENDING: i64 = 1;

// =============================================================================
// Listing helpers
// =============================================================================

pub(crate) fn unknown(kind: &'static str, value: &str) -> CoreError {
    CoreError::UnknownValue {
        kind,
        value: value.to_string(),
    }
}

/// Normalizes a user-typed key (`"Selling Price"`, `"selling_price"`) for matching.
pub(crate) fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '_'], "-")
}

pub(crate) fn active_label(is_active: bool) -> Cow<'static, str> {
    Cow::Borrowed(if is_active { "active" } else { "inactive" })
}

pub(crate) fn lookup_name(value: &Option<Named>) -> Option<Cow<'_, str>> {
    value.as_ref().map(|n| Cow::Borrowed(n.name.as_str()))
}

pub(crate) fn lookup_str(value: &Option<Named>) -> Option<&str> {
    value.as_ref().map(|n| n.name.as_str())
}
