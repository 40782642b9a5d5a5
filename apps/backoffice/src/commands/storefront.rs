//! Customer storefront: catalogue, cart, checkout and own orders.

use anyhow::Result;
use chrono::Local;

use threadline_client::{ClientError, RemoteCollection};
use threadline_core::entities::{Order, OrderSchema};
use threadline_core::Screen;

use crate::cli::{CartCommand, CheckoutArgs};
use crate::context::AppContext;
use crate::render::{print_cart, print_json, print_rows};

pub async fn shop(ctx: &AppContext) -> Result<()> {
    ctx.session().require_view(Screen::Storefront).await?;
    let products = ctx.storefront().catalogue().await?;
    print_rows(&products.iter().collect::<Vec<_>>(), ctx.json)
}

pub async fn cart(ctx: &AppContext, command: CartCommand) -> Result<()> {
    ctx.session().require_view(Screen::Cart).await?;
    let shop = ctx.storefront();
    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            shop.add_to_cart(product_id, quantity).await?;
        }
        CartCommand::Set {
            product_id,
            quantity,
        } => {
            shop.set_quantity(product_id, quantity).await?;
        }
        CartCommand::Remove { product_id } => {
            shop.remove_from_cart(product_id).await?;
        }
        CartCommand::Clear => shop.clear_cart().await?,
    }
    print_cart(&shop.cart().await, ctx.json)
}

pub async fn checkout(ctx: &AppContext, args: CheckoutArgs) -> Result<()> {
    let today = Local::now().date_naive();
    match ctx.storefront().checkout(&args.address, today).await {
        Ok(receipt) => {
            if ctx.json {
                return print_json(&receipt.order_nos);
            }
            println!("Placed {} order(s), total {}", receipt.order_nos.len(), receipt.total);
            for order_no in &receipt.order_nos {
                println!("  {order_no}");
            }
            Ok(())
        }
        Err(ClientError::CheckoutIncomplete { placed, source }) => {
            for order_no in &placed {
                println!("Placed {order_no}");
            }
            println!("Placed items were removed from your cart; check out again for the rest");
            Err(ClientError::CheckoutIncomplete { placed, source }.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn my_orders(ctx: &AppContext) -> Result<()> {
    ctx.session().require_view(Screen::MyOrders).await?;
    let user = ctx.session().require_user().await?;
    let customer_id = user.customer_id.ok_or(ClientError::NoCustomerProfile {
        username: user.username.clone(),
    })?;

    let orders = ctx.resource::<OrderSchema>().list().await?;
    let mine: Vec<&Order> = orders
        .iter()
        .filter(|o| o.is_for_customer(customer_id))
        .collect();
    print_rows(&mine, ctx.json)
}
