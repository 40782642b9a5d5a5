//! # Shared Domain Types
//!
//! Types shared by every entity module: nested id references, lookup rows,
//! users and the role → dashboard map.
//!
//! ## Reference Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Forms send references, records receive resolved rows                   │
//! │                                                                         │
//! │  POST /products                      GET /products                      │
//! │  {                                   [{                                 │
//! │    "productNo": "PRD17...",            "id": 7,                         │
//! │    "category": { "id": 3 },  ────►     "category": { "id": 3,           │
//! │    "supplier": { "id": 9 }                           "name": "Denim" }, │
//! │  }                                     ...                              │
//! │                                      }]                                 │
//! │       Ref                                 Named                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// References
// =============================================================================

/// A nested `{ "id": n }` foreign-key reference sent in create/update bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ref {
    pub id: i64,
}

impl Ref {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Ref { id }
    }
}

/// A resolved lookup row (category, status, province, supplier summary...).
///
/// The backend names the label column differently per table, hence the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Named {
    pub id: i64,
    #[serde(
        default,
        alias = "categoryName",
        alias = "statusName",
        alias = "provinceName",
        alias = "supplierName",
        alias = "providerName",
        alias = "fullName"
    )]
    pub name: String,
}

impl Named {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Named {
            id,
            name: name.into(),
        }
    }

    /// Returns the bare reference to this row.
    #[inline]
    pub fn reference(&self) -> Ref {
        Ref::new(self.id)
    }
}

// =============================================================================
// Roles
// =============================================================================

/// The five roles that own a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Ceo,
    ProductManager,
    MerchandiseManager,
    DispatchOfficer,
    Customer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Ceo,
        Role::ProductManager,
        Role::MerchandiseManager,
        Role::DispatchOfficer,
        Role::Customer,
    ];

    /// Backend spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::ProductManager => "PRODUCT_MANAGER",
            Role::MerchandiseManager => "MERCHANDISE_MANAGER",
            Role::DispatchOfficer => "DISPATCH_OFFICER",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Screens shown on this role's dashboard.
    ///
    /// ```text
    /// ┌──────────────────────┬───────────────────────────────────────────────┐
    /// │ CEO                  │ employees products customers orders suppliers │
    /// │                      │ supplier-payments delivery-providers          │
    /// │ Product Manager      │ products suppliers                            │
    /// │ Merchandise Manager  │ products suppliers supplier-payments alerts   │
    /// │ Dispatch Officer     │ orders deliveries delivery-providers          │
    /// │ Customer             │ storefront cart my-orders                     │
    /// └──────────────────────┴───────────────────────────────────────────────┘
    /// ```
    pub fn screens(&self) -> &'static [Screen] {
        match self {
            Role::Ceo => &[
                Screen::Employees,
                Screen::Products,
                Screen::Customers,
                Screen::Orders,
                Screen::Suppliers,
                Screen::SupplierPayments,
                Screen::DeliveryProviders,
            ],
            Role::ProductManager => &[Screen::Products, Screen::Suppliers],
            Role::MerchandiseManager => &[
                Screen::Products,
                Screen::Suppliers,
                Screen::SupplierPayments,
                Screen::StockAlerts,
            ],
            Role::DispatchOfficer => &[
                Screen::Orders,
                Screen::Deliveries,
                Screen::DeliveryProviders,
            ],
            Role::Customer => &[Screen::Storefront, Screen::Cart, Screen::MyOrders],
        }
    }

    /// Whether the screen appears on this role's dashboard.
    pub fn can_view(&self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }

    /// Whether this role may create, edit or delete through the screen.
    pub fn can_manage(&self, screen: Screen) -> bool {
        self.can_view(screen) && screen.is_editable()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Accepts the backend spelling and friendlier variants
    /// (`"product manager"`, `"product-manager"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "CEO" => Ok(Role::Ceo),
            "PRODUCT_MANAGER" => Ok(Role::ProductManager),
            "MERCHANDISE_MANAGER" => Ok(Role::MerchandiseManager),
            "DISPATCH_OFFICER" => Ok(Role::DispatchOfficer),
            "CUSTOMER" => Ok(Role::Customer),
            _ => Err(CoreError::UnknownValue {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Screens
// =============================================================================

/// One surface of a role dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Employees,
    Products,
    Customers,
    Orders,
    Suppliers,
    SupplierPayments,
    DeliveryProviders,
    Deliveries,
    StockAlerts,
    Storefront,
    Cart,
    MyOrders,
}

impl Screen {
    /// CRUD screens; the rest are read-only views or client-side state.
    pub fn is_editable(&self) -> bool {
        !matches!(
            self,
            Screen::StockAlerts | Screen::Storefront | Screen::Cart | Screen::MyOrders
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Employees => "employees",
            Screen::Products => "products",
            Screen::Customers => "customers",
            Screen::Orders => "orders",
            Screen::Suppliers => "suppliers",
            Screen::SupplierPayments => "supplier-payments",
            Screen::DeliveryProviders => "delivery-providers",
            Screen::Deliveries => "deliveries",
            Screen::StockAlerts => "stock-alerts",
            Screen::Storefront => "storefront",
            Screen::Cart => "cart",
            Screen::MyOrders => "my-orders",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Users
// =============================================================================

/// The authenticated account, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// Customer row linked to a customer account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================
