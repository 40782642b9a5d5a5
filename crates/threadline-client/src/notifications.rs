//! # Stock Alert Poller
//!
//! Reorder notifications for the merchandise manager.
//!
//! ```text
//! ┌───────────────────────┐  every poll_interval   ┌──────────────────────┐
//! │  poll loop (task)     │───── GET /products ───►│  RemoteCollection    │
//! │                       │◄────── products ───────│                      │
//! │  stock_alerts()       │                        └──────────────────────┘
//! │        │              │
//! │        ▼              │      fetch failed: warn, keep previous alerts
//! │  watch::Sender ───────┼──► StockAlertPoller::subscribe() / current()
//! │        ▲              │
//! │  shutdown_rx ◄────────┼─── stop() / Drop
//! └───────────────────────┘
//! ```

use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use threadline_core::calc::StockSeverity;
use threadline_core::entities::{Product, ProductSchema};

use crate::resource::RemoteCollection;

/// One product that needs reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub product_id: i64,
    pub product_no: String,
    pub name: String,
    pub quantity_in_stock: i64,
    pub reorder_level: i64,
    pub severity: StockSeverity,
}

/// Products with a reorder level whose stock needs attention, most severe
/// first. Products of equal severity keep their input order.
pub fn stock_alerts(products: &[Product]) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = products
        .iter()
        .filter_map(|p| {
            let reorder_level = p.reorder_level?;
            let severity = p.severity()?;
            severity.needs_attention().then(|| StockAlert {
                product_id: p.id,
                product_no: p.product_no.clone(),
                name: p.name.clone(),
                quantity_in_stock: p.quantity_in_stock,
                reorder_level,
                severity,
            })
        })
        .collect();
    alerts.sort_by_key(|a| a.severity);
    alerts
}

// =============================================================================
// Poller
// =============================================================================

/// Background task publishing the current stock alerts.
pub struct StockAlertPoller {
    alerts: watch::Receiver<Vec<StockAlert>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StockAlertPoller {
    /// Starts polling immediately, then every `interval`.
    pub fn spawn<R>(remote: R, interval: Duration) -> Self
    where
        R: RemoteCollection<ProductSchema> + 'static,
    {
        let (alerts_tx, alerts_rx) = watch::channel(Vec::new());
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = tokio::spawn(poll_loop(remote, interval, alerts_tx, shutdown_rx));
        info!(interval_secs = interval.as_secs(), "Stock alert poller started");

        StockAlertPoller {
            alerts: alerts_rx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Receiver that wakes on every change of the alert list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<StockAlert>> {
        self.alerts.clone()
    }

    pub fn current(&self) -> Vec<StockAlert> {
        self.alerts.borrow().clone()
    }

    /// Signals the task and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StockAlertPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn poll_loop<R>(
    remote: R,
    interval: Duration,
    alerts_tx: watch::Sender<Vec<StockAlert>>,
    mut shutdown_rx: mpsc::Receiver<()>,
) where
    R: RemoteCollection<ProductSchema>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match remote.list().await {
                    Ok(products) => {
                        let alerts = stock_alerts(&products);
                        debug!(alerts = alerts.len(), "Stock levels checked");
                        alerts_tx.send_if_modified(|current| {
                            if *current == alerts {
                                false
                            } else {
                                *current = alerts;
                                true
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Stock check failed, keeping previous alerts");
                    }
                }
            }

            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    info!("Stock alert poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::orchestrator::tests::FakeProducts;

    fn stocked(id: i64, stock: i64, reorder: Option<i64>) -> Product {
        Product {
            id,
            product_no: format!("PRD{id}"),
            name: format!("Item {id}"),
            quantity_in_stock: stock,
            reorder_level: reorder,
            is_active: true,
            ..Product::default()
        }
    }

    #[test]
    fn test_alerts_most_severe_first() {
        let products = vec![
            stocked(1, 60, Some(100)),
            stocked(2, 150, Some(100)),
            stocked(3, 20, Some(100)),
            stocked(4, 0, None),
            stocked(5, 90, Some(100)),
            stocked(6, 40, Some(100)),
        ];
        let alerts = stock_alerts(&products);
        let order: Vec<(i64, StockSeverity)> =
            alerts.iter().map(|a| (a.product_id, a.severity)).collect();
        assert_eq!(
            order,
            vec![
                (3, StockSeverity::Critical),
                (6, StockSeverity::Low),
                (1, StockSeverity::Warning),
                (5, StockSeverity::Warning),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_publishes_and_keeps_alerts_on_failure() {
        let fake = FakeProducts::with(vec![stocked(1, 20, Some(100))]);
        let poller = StockAlertPoller::spawn(fake.clone(), Duration::from_secs(30));
        let mut rx = poller.subscribe();

        rx.wait_for(|alerts| alerts.len() == 1).await.unwrap();
        assert_eq!(poller.current()[0].severity, StockSeverity::Critical);

        *fake.fail_list.lock().unwrap() = true;
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fake.lists.load(Ordering::SeqCst), 2);
        assert_eq!(poller.current().len(), 1);

        *fake.fail_list.lock().unwrap() = false;
        fake.rows.lock().unwrap().push(stocked(2, 60, Some(100)));
        rx.wait_for(|alerts| alerts.len() == 2).await.unwrap();

        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_poller_makes_no_more_requests() {
        let fake = FakeProducts::with(vec![stocked(1, 20, Some(100))]);
        let poller = StockAlertPoller::spawn(fake.clone(), Duration::from_secs(30));
        poller.subscribe().wait_for(|a| !a.is_empty()).await.unwrap();
        poller.stop().await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fake.lists.load(Ordering::SeqCst), 1);
    }
}
