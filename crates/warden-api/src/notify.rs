//! Order confirmation notifications.
//!
//! Notifications are fire-and-forget: the order is already committed when
//! the notifier runs, and a failed delivery is only logged.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::store::Record;

/// What a confirmation message is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    /// The new order's id.
    pub order_id: u64,
    /// Where the confirmation goes.
    pub recipient: String,
    /// The order's attributes (product, quantity, total, ...).
    pub details: Map<String, Value>,
}

impl OrderConfirmation {
    /// Confirmation for `order`. An `email` attribute on the order wins over
    /// the account email of whoever placed it.
    pub fn for_order(order: &Record, account_email: &str) -> Self {
        let recipient = order
            .data
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or(account_email)
            .to_string();
        Self {
            order_id: order.id,
            recipient,
            details: order.data.clone(),
        }
    }

    /// Subject line of the confirmation message.
    pub fn subject(&self) -> String {
        format!("Order Confirmation - Order #{}", self.order_id)
    }
}

/// Delivers order confirmations.
pub trait OrderNotifier: Send + Sync {
    /// Deliver one confirmation.
    fn notify(
        &self,
        confirmation: OrderConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>>;
}

/// Notifier that writes confirmations to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl OrderNotifier for LogNotifier {
    fn notify(
        &self,
        confirmation: OrderConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>> {
        Box::pin(async move {
            log::info!(
                "{} sent to {}",
                confirmation.subject(),
                confirmation.recipient
            );
            Ok(())
        })
    }
}

/// Run `notifier` on a background task. Never blocks the caller.
///
/// The handle resolves to whether delivery succeeded; a failure has already
/// been logged by then. Dropping the handle detaches the task.
pub fn spawn_confirmation(
    notifier: Arc<dyn OrderNotifier>,
    confirmation: OrderConfirmation,
) -> JoinHandle<bool> {
    let order_id = confirmation.order_id;
    tokio::spawn(async move {
        match notifier.notify(confirmation).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to send confirmation for order #{order_id}: {e}");
                false
            }
        }
    })
}
