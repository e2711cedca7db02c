//! Customer notification interface and in-process implementations.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderStatus;
use serde::Serialize;
use thiserror::Error;

/// Which order event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderCreated,
    StatusChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderCreated => "order_created",
            NotificationKind::StatusChanged => "status_changed",
        }
    }
}

/// A message addressed to the customer who placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderNotification {
    pub kind: NotificationKind,
    /// Customer e-mail address as stored on the order.
    pub recipient: String,
    pub customer_name: String,
    pub code: String,
    pub service_name: String,
    pub status: OrderStatus,
    pub tracking_url: String,
}

impl OrderNotification {
    /// Subject line for the message.
    pub fn subject(&self) -> String {
        match self.kind {
            NotificationKind::OrderCreated => format!("Order received: {}", self.code),
            NotificationKind::StatusChanged => {
                format!("Order {} is now {}", self.code, self.status)
            }
        }
    }
}

/// Errors a dispatcher can report.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The transport rejected or failed to deliver the message.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The stored address cannot be used.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Sends order notifications to customers.
///
/// Delivery may fail independently of the order write it follows. Callers
/// treat every error as non-fatal.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send_order_created(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError>;

    async fn send_status_changed(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError>;
}

/// Dispatcher that writes messages to the structured log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

impl LoggingDispatcher {
    fn log(notification: &OrderNotification) {
        tracing::info!(
            kind = notification.kind.as_str(),
            recipient = %notification.recipient,
            code = %notification.code,
            status = %notification.status,
            tracking_url = %notification.tracking_url,
            subject = %notification.subject(),
            "order notification"
        );
    }
}

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn send_order_created(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError> {
        Self::log(notification);
        Ok(())
    }

    async fn send_status_changed(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError> {
        Self::log(notification);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryDispatcherState {
    sent: Vec<OrderNotification>,
    fail: bool,
}

/// Dispatcher that records messages in memory, for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDispatcher {
    state: Arc<RwLock<InMemoryDispatcherState>>,
}

impl InMemoryDispatcher {
    /// Creates a new in-memory dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the dispatcher to fail every send.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Returns every message delivered so far.
    pub fn sent(&self) -> Vec<OrderNotification> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the number of delivered messages of `kind`.
    pub fn sent_count(&self, kind: NotificationKind) -> usize {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }

    fn deliver(&self, notification: &OrderNotification) -> Result<(), NotificationError> {
        let mut state = self.state.write().unwrap();

        if state.fail {
            return Err(NotificationError::Delivery(
                "SMTP connection refused".to_string(),
            ));
        }

        state.sent.push(notification.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryDispatcher {
    async fn send_order_created(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError> {
        self.deliver(notification)
    }

    async fn send_status_changed(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), NotificationError> {
        self.deliver(notification)
    }
}
