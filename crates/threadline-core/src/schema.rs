//! # Entity Schema Descriptors
//!
//! One descriptor per managed entity drives the generic list/detail
//! controller, so employees, products, orders and the rest share a single
//! implementation instead of a near-identical screen each.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EntitySchema                                                           │
//! │  ├── RESOURCE        "products"        → GET/POST/PUT/DELETE path       │
//! │  ├── SCREEN          Screen::Products  → role permission check          │
//! │  ├── Record          Product           → list rows (Listable)           │
//! │  ├── Form            ProductForm       → POST/PUT body                  │
//! │  ├── new_form()      generated number, defaults                         │
//! │  ├── edit_form(r)    record → form                                      │
//! │  ├── prepare(f)      derived fields (profit %, totals, tracking no)     │
//! │  └── validate(f)     all violated rules                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::query::Listable;
use crate::types::Screen;
use crate::validation::Violations;

/// Descriptor for one REST-backed entity.
pub trait EntitySchema: Send + Sync + 'static {
    /// Collection path segment (`/products`).
    const RESOURCE: &'static str;

    /// Plural label used in user-facing messages ("Failed to load products").
    const LABEL: &'static str;

    /// Field name accepted by `GET /<resource>/search?<field>=<term>`.
    const SEARCH_FIELD: &'static str;

    /// Dashboard screen that manages this entity.
    const SCREEN: Screen;

    /// Row as returned by the backend.
    type Record: Listable + DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync;

    /// Create/update body.
    type Form: DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync;

    /// Numeric id of a record (path parameter for PUT/DELETE).
    fn record_id(record: &Self::Record) -> i64;

    /// Blank form for a create, with a generated business number.
    fn new_form() -> Self::Form;

    /// Form pre-filled from an existing record.
    fn edit_form(record: &Self::Record) -> Self::Form;

    /// Recomputes derived fields right before validation and submission.
    fn prepare(_form: &mut Self::Form) {}

    /// Every violated rule, in field order.
    fn validate(form: &Self::Form) -> Violations;
}
