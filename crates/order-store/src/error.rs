use thiserror::Error;

use crate::{OrderId, OrderStatus};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another order already holds this code. Codes stay reserved after a
    /// soft delete, so this also fires for deleted orders.
    #[error("Order code already exists: {code}")]
    DuplicateCode { code: String },

    /// A guarded status write found the order in a different status than
    /// the caller validated against.
    #[error("Status conflict for order {order_id}: expected {expected}, found {actual}")]
    StatusConflict {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// A stored row could not be mapped back into an order.
    #[error("Invalid order row: {0}")]
    InvalidRow(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
