//! # Storefront and Checkout
//!
//! Cart edits go through the session so they survive between CLI runs.
//! Checkout turns every cart line into one pending order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. customer signed in, has a customer id                               │
//! │  2. shipping address present, cart not empty                            │
//! │  3. build + validate EVERY draft          ── any violation ──► stop     │
//! │  4. POST /orders, one per line, in cart order                           │
//! │        │                                                                │
//! │        ├── all ok ──► clear cart ──► Receipt { order numbers, total }   │
//! │        │                                                                │
//! │        └── line n fails ──► CheckoutIncomplete { placed[..n], cause }   │
//! │                             placed lines leave the cart, rest kept      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use tracing::{error, info, warn};

use threadline_core::cart::{Cart, CartTotals};
use threadline_core::entities::{OrderForm, OrderSchema, Product, ProductSchema};
use threadline_core::{CoreError, Money, Role, Screen, User, Violations};

use crate::error::{ClientError, ClientResult};
use crate::resource::RemoteCollection;
use crate::session::SessionHandle;

/// Orders placed by a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub order_nos: Vec<String>,
    pub total: Money,
}

/// Customer-facing cart and checkout over a product and an order collection.
pub struct Storefront<P, O> {
    session: SessionHandle,
    products: P,
    orders: O,
}

impl<P, O> Storefront<P, O>
where
    P: RemoteCollection<ProductSchema>,
    O: RemoteCollection<OrderSchema>,
{
    pub fn new(session: SessionHandle, products: P, orders: O) -> Self {
        Storefront {
            session,
            products,
            orders,
        }
    }

    /// Active products, as the storefront lists them.
    pub async fn catalogue(&self) -> ClientResult<Vec<Product>> {
        let products = self.products.list().await?;
        Ok(products.into_iter().filter(|p| p.is_active).collect())
    }

    pub async fn cart(&self) -> Cart {
        self.session.cart().await
    }

    pub async fn totals(&self) -> CartTotals {
        CartTotals::from(&self.session.cart().await)
    }

    /// Adds `quantity` of a product, checked against its current stock.
    pub async fn add_to_cart(&self, product_id: i64, quantity: i64) -> ClientResult<CartTotals> {
        let product = self.products.get(product_id).await?;
        self.session
            .update_cart(|cart| {
                cart.add_item(&product, quantity)?;
                Ok(cart.totals())
            })
            .await
    }

    pub async fn set_quantity(&self, product_id: i64, quantity: i64) -> ClientResult<CartTotals> {
        self.session
            .update_cart(|cart| {
                cart.set_quantity(product_id, quantity)?;
                Ok(cart.totals())
            })
            .await
    }

    pub async fn remove_from_cart(&self, product_id: i64) -> ClientResult<CartTotals> {
        self.session
            .update_cart(|cart| {
                cart.remove_item(product_id)?;
                Ok(cart.totals())
            })
            .await
    }

    pub async fn clear_cart(&self) -> ClientResult<()> {
        self.session
            .update_cart(|cart| {
                cart.clear();
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Places one order per cart line, dated `today`.
    pub async fn checkout(&self, shipping_address: &str, today: NaiveDate) -> ClientResult<Receipt> {
        let user = self.session.require_view(Screen::Cart).await?;
        let customer_id = customer_id(&user)?;

        let mut v = Violations::new();
        v.required("Shipping address", shipping_address);
        v.into_result()?;

        let cart = self.session.cart().await;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let drafts = drafts(&cart, customer_id, shipping_address, today)?;

        let mut placed = Vec::with_capacity(drafts.len());
        let mut placed_products = Vec::with_capacity(drafts.len());
        for (item, draft) in cart.items.iter().zip(&drafts) {
            if let Err(e) = self.orders.create(draft).await {
                error!(
                    placed = placed.len(),
                    remaining = drafts.len() - placed.len(),
                    error = %e,
                    "Checkout interrupted"
                );
                self.drop_placed_lines(&placed_products).await;
                return Err(ClientError::CheckoutIncomplete {
                    placed,
                    source: Box::new(e),
                });
            }
            placed.push(draft.order_no.clone());
            placed_products.push(item.product_id);
        }

        let total = cart.total();
        self.clear_cart().await?;
        info!(orders = placed.len(), total = %total, "Checkout complete");
        Ok(Receipt {
            order_nos: placed,
            total,
        })
    }
}

impl<P, O> Storefront<P, O> {
    /// Takes already ordered lines out of the cart so a retry only posts the rest.
    async fn drop_placed_lines(&self, product_ids: &[i64]) {
        if product_ids.is_empty() {
            return;
        }
        let dropped = self
            .session
            .update_cart(|cart| {
                cart.items.retain(|i| !product_ids.contains(&i.product_id));
                Ok(())
            })
            .await;
        if let Err(e) = dropped {
            warn!(error = %e, lines = product_ids.len(), "Could not drop placed lines from cart");
        }
    }
}

fn customer_id(user: &User) -> ClientResult<i64> {
    match (user.role, user.customer_id) {
        (Role::Customer, Some(id)) => Ok(id),
        (Role::Customer, None) => Err(ClientError::NoCustomerProfile {
            username: user.username.clone(),
        }),
        (role, _) => Err(ClientError::Forbidden {
            role: role.to_string(),
            screen: Screen::Cart,
        }),
    }
}

/// One validated order draft per cart line.
fn drafts(
    cart: &Cart,
    customer_id: i64,
    shipping_address: &str,
    today: NaiveDate,
) -> ClientResult<Vec<OrderForm>> {
    let mut out = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        let draft = OrderForm::draft(
            customer_id,
            item.product_id,
            item.unit_price,
            item.quantity,
            shipping_address,
            today,
        );
        draft.validate().into_result()?;
        out.push(draft);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use threadline_core::entities::Order;

    use crate::orchestrator::tests::FakeProducts;

    /// Records posted drafts; fails the n-th create when told to.
    #[derive(Default, Clone)]
    struct FakeOrders {
        posted: Arc<Mutex<Vec<OrderForm>>>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl RemoteCollection<OrderSchema> for FakeOrders {
        async fn list(&self) -> ClientResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn get(&self, _id: i64) -> ClientResult<Order> {
            Err(ClientError::Network("unused".into()))
        }

        async fn search(&self, _term: &str) -> ClientResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn create(&self, form: &OrderForm) -> ClientResult<()> {
            let mut posted = self.posted.lock().unwrap();
            if self.fail_at == Some(posted.len()) {
                return Err(ClientError::Network("connection reset".into()));
            }
            posted.push(form.clone());
            Ok(())
        }

        async fn update(&self, _id: i64, _form: &OrderForm) -> ClientResult<()> {
            Ok(())
        }

        async fn delete(&self, _id: i64) -> ClientResult<()> {
            Ok(())
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![
            Product {
                id: 1,
                product_no: "PRD1".into(),
                name: "Linen Shirt".into(),
                selling_price: Money::from_major(10.0),
                quantity_in_stock: 5,
                is_active: true,
                ..Product::default()
            },
            Product {
                id: 2,
                product_no: "PRD2".into(),
                name: "Sarong".into(),
                selling_price: Money::from_major(5.0),
                quantity_in_stock: 3,
                is_active: true,
                ..Product::default()
            },
            Product {
                id: 3,
                name: "Retired Tee".into(),
                selling_price: Money::from_major(4.0),
                quantity_in_stock: 9,
                is_active: false,
                ..Product::default()
            },
        ]
    }

    async fn customer_session() -> SessionHandle {
        let session = SessionHandle::in_memory();
        let user = User {
            id: 10,
            username: "amaya".into(),
            role: Role::Customer,
            customer_id: Some(42),
        };
        session.sign_in("tok".into(), user).await.unwrap();
        session
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_places_one_order_per_line() {
        let orders = FakeOrders::default();
        let shop = Storefront::new(
            customer_session().await,
            FakeProducts::with(catalogue()),
            orders.clone(),
        );

        shop.add_to_cart(1, 2).await.unwrap();
        let totals = shop.add_to_cart(2, 3).await.unwrap();
        assert_eq!(totals.total, Money::from_major(35.0));

        let receipt = shop.checkout("12 Galle Road, Colombo", today()).await.unwrap();
        assert_eq!(receipt.order_nos.len(), 2);
        assert_eq!(receipt.total, Money::from_major(35.0));
        assert!(shop.cart().await.is_empty());

        let posted = orders.posted.lock().unwrap();
        assert_eq!(posted[0].total_price, Money::from_major(20.0));
        assert_eq!(posted[1].customer.map(|r| r.id), Some(42));
        assert_eq!(posted[1].order_status.map(|r| r.id), Some(1));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_only_unplaced_lines() {
        let orders = FakeOrders {
            fail_at: Some(1),
            ..FakeOrders::default()
        };
        let shop = Storefront::new(
            customer_session().await,
            FakeProducts::with(catalogue()),
            orders.clone(),
        );
        shop.add_to_cart(1, 1).await.unwrap();
        shop.add_to_cart(2, 1).await.unwrap();

        let err = shop.checkout("12 Galle Road", today()).await.unwrap_err();
        match err {
            ClientError::CheckoutIncomplete { placed, .. } => assert_eq!(placed.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
        let cart = shop.cart().await;
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items[0].product_id, 2);

        // Retrying posts only the line that was not ordered yet.
        let retry = Storefront::new(
            shop.session.clone(),
            FakeProducts::with(catalogue()),
            FakeOrders {
                posted: orders.posted.clone(),
                fail_at: None,
            },
        );
        let receipt = retry.checkout("12 Galle Road", today()).await.unwrap();
        assert_eq!(receipt.order_nos.len(), 1);
        assert_eq!(receipt.total, Money::from_major(5.0));

        let posted = orders.posted.lock().unwrap();
        let products: Vec<i64> = posted.iter().filter_map(|o| o.product.map(|r| r.id)).collect();
        assert_eq!(products, vec![1, 2]);
        assert!(retry.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_preconditions() {
        let orders = FakeOrders::default();
        let shop = Storefront::new(
            customer_session().await,
            FakeProducts::with(catalogue()),
            orders.clone(),
        );

        let err = shop.checkout("   ", today()).await.unwrap_err();
        assert_eq!(err.to_string(), "Shipping address is required");

        let err = shop.checkout("12 Galle Road", today()).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::EmptyCart)));
        assert!(orders.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_staff_cannot_check_out() {
        let session = SessionHandle::in_memory();
        let user = User {
            id: 1,
            username: "ruwan".into(),
            role: Role::DispatchOfficer,
            customer_id: None,
        };
        session.sign_in("tok".into(), user).await.unwrap();
        let shop = Storefront::new(session, FakeProducts::default(), FakeOrders::default());

        let err = shop.checkout("12 Galle Road", today()).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_cart_rules_and_catalogue() {
        let shop = Storefront::new(
            customer_session().await,
            FakeProducts::with(catalogue()),
            FakeOrders::default(),
        );

        assert_eq!(shop.catalogue().await.unwrap().len(), 2);
        assert!(shop.add_to_cart(3, 1).await.is_err());
        assert!(shop.add_to_cart(2, 4).await.is_err());

        shop.add_to_cart(2, 2).await.unwrap();
        let totals = shop.set_quantity(2, 3).await.unwrap();
        assert_eq!(totals.total_quantity, 3);
        let totals = shop.remove_from_cart(2).await.unwrap();
        assert_eq!(totals.item_count, 0);
    }
}
