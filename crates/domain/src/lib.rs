//! Domain layer for the order lifecycle service.
//!
//! This crate provides:
//! - the order status state machine (`OrderLifecycle`)
//! - tracking code generation (`OrderCodeGenerator`)
//! - collaborator interfaces for notifications, the service catalogue and caches
//! - `OrderService`, which ties them to an `OrderRepository`

pub mod error;
pub mod order;

pub use error::DomainError;
pub use order::{
    CacheInvalidator, CacheTag, CodeChecker, CreateOrder, InMemoryDispatcher,
    InMemoryServiceCatalog, LoggingDispatcher, NoopInvalidator, NotificationDispatcher,
    NotificationError, NotificationKind, OrderCodeGenerator, OrderCreated, OrderError,
    OrderLifecycle, OrderNotification, OrderService, OrderTracking, OrderUpdated, ParsedCode,
    ServiceCatalog, parse_code,
};
