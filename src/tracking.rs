//! Background order status polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::OrderingApi;
use crate::models::Order;

/// Default time between two status polls.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Polls one order until it is delivered or the tracker is dropped.
///
/// The most recent snapshot is published on a watch channel; poll failures
/// are logged and the previous snapshot is kept.
pub struct OrderTracker {
    order_id: String,
    rx: watch::Receiver<Option<Order>>,
    handle: JoinHandle<()>,
}

impl OrderTracker {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn spawn(api: Arc<dyn OrderingApi>, order_id: impl Into<String>, interval: Duration) -> Self {
        let order_id = order_id.into();
        let (tx, rx) = watch::channel(None);
        let id = order_id.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match api.order(&id).await {
                    Ok(order) => {
                        let done = order.status.is_final();
                        tracing::debug!(order_id = %id, status = %order.status, "order status polled");
                        if tx.send(Some(order)).is_err() {
                            break;
                        }
                        if done {
                            tracing::info!(order_id = %id, "order delivered, tracking stopped");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(order_id = %id, error = %e, "order status poll failed");
                    }
                }
            }
        });

        Self {
            order_id,
            rx,
            handle,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Latest polled snapshot, `None` until the first successful poll.
    pub fn latest(&self) -> Option<Order> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Order>> {
        self.rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
