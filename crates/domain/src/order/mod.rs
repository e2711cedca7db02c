//! Order lifecycle and related types.

mod cache;
mod catalog;
mod code;
mod commands;
mod lifecycle;
mod notifier;
mod service;

pub use cache::{CacheInvalidator, CacheTag, NoopInvalidator};
pub use catalog::{InMemoryServiceCatalog, ServiceCatalog};
pub use code::{CodeChecker, OrderCodeGenerator, ParsedCode, parse_code};
pub use commands::{CreateOrder, OrderCreated, OrderTracking, OrderUpdated};
pub use lifecycle::OrderLifecycle;
pub use notifier::{
    InMemoryDispatcher, LoggingDispatcher, NotificationDispatcher, NotificationError,
    NotificationKind, OrderNotification,
};
pub use service::{DEFAULT_TRACKING_BASE_URL, OrderService};

use common::{OrderId, OrderStatus};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No live order with this ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The requested status is not a legal next step from the current one.
    #[error("Illegal status transition: cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Every candidate tracking code was already taken.
    #[error("Could not generate a unique order code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },
}
