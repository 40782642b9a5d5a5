//! # Storefront Cart
//!
//! Client-side basket held in the session until checkout or an explicit clear.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront Action       Cart Operation            State Change         │
//! │  ─────────────────       ──────────────            ────────────         │
//! │                                                                         │
//! │  Add to cart ──────────► add_item(product, n) ──► merge or push line    │
//! │  Change quantity ──────► set_quantity(id, n) ───► qty = n (0 removes)   │
//! │  Remove ───────────────► remove_item(id) ───────► line dropped          │
//! │  Checkout succeeded ───► clear() ───────────────► empty basket          │
//! │                                                                         │
//! │  Every line keeps 1 ≤ quantity ≤ quantityInStock.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are frozen when a line is added, so the basket total does not move
//! while the customer shops even if the catalog is reloaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calc::{grand_total, line_total};
use crate::entities::product::Product;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// One basket line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    pub product_no: String,
    pub name: String,
    /// Selling price when the line was added.
    pub unit_price: Money,
    pub quantity: i64,
    /// Stock level seen when the line was last touched; the upper bound for
    /// `quantity`.
    pub quantity_in_stock: i64,
    #[ts(type = "string")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id,
            product_no: product.product_no.clone(),
            name: product.name.clone(),
            unit_price: product.selling_price,
            quantity,
            quantity_in_stock: product.quantity_in_stock,
            added_at: Utc::now(),
        }
    }

    pub fn line_total(&self) -> Money {
        line_total(self.unit_price, self.quantity)
    }
}

/// The customer's basket.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again merges quantities)
/// - `1 ≤ quantity ≤ quantity_in_stock` on every line
/// - At most [`crate::MAX_CART_ITEMS`] distinct lines
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds `quantity` of a product, merging with an existing line.
    ///
    /// Inactive or out-of-stock products are refused, as is any quantity
    /// that would push the line past the stock level.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        if !product.is_available() {
            return Err(CoreError::ProductUnavailable(product.name.clone()));
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let requested = item.quantity.saturating_add(quantity);
            if requested > product.quantity_in_stock {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity_in_stock,
                    requested,
                });
            }
            item.quantity = requested;
            item.quantity_in_stock = product.quantity_in_stock;
            return Ok(());
        }

        if quantity > product.quantity_in_stock {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity_in_stock,
                requested: quantity,
            });
        }
        if self.items.len() >= crate::MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: crate::MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Replaces a line's quantity. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        if quantity < 0 {
            return Err(CoreError::InvalidQuantity(quantity));
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        if quantity > item.quantity_in_stock {
            return Err(CoreError::InsufficientStock {
                product: item.name.clone(),
                available: item.quantity_in_stock,
                requested: quantity,
            });
        }
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: i64) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            Err(CoreError::NotInCart(product_id))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total(&self) -> Money {
        grand_total(self.items.iter().map(|i| (i.unit_price, i.quantity)))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

/// Summary shown under the basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
