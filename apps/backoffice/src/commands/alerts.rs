//! Merchandise-manager reorder notifications.

use anyhow::Result;
use tracing::info;

use threadline_client::{stock_alerts, RemoteCollection, StockAlertPoller};
use threadline_core::entities::ProductSchema;
use threadline_core::Screen;

use crate::cli::AlertsArgs;
use crate::context::AppContext;
use crate::render::print_rows;

pub async fn alerts(ctx: &AppContext, args: AlertsArgs) -> Result<()> {
    ctx.session().require_view(Screen::StockAlerts).await?;

    if !args.watch {
        let products = ctx.resource::<ProductSchema>().list().await?;
        let alerts = stock_alerts(&products);
        return print_rows(&alerts.iter().collect::<Vec<_>>(), ctx.json);
    }

    let poller = StockAlertPoller::spawn(
        ctx.resource::<ProductSchema>(),
        ctx.config.poll_interval(),
    );
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let alerts = updates.borrow_and_update().clone();
                println!();
                print_rows(&alerts.iter().collect::<Vec<_>>(), ctx.json)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    poller.stop().await;
    Ok(())
}
