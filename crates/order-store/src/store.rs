use async_trait::async_trait;

use crate::{
    NewOrder, Order, OrderId, OrderPatch, OrderQuery, OrderStatistics, OrderStatus, Page, Result,
};

/// Options for updating an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Status the order must still be in for the write to apply.
    /// If None, the write is last-write-wins.
    pub expected_status: Option<OrderStatus>,
}

impl UpdateOptions {
    /// Creates options with no status guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that only apply the write while the order is in `status`.
    pub fn expect_status(status: OrderStatus) -> Self {
        Self {
            expected_status: Some(status),
        }
    }
}

/// Core trait for order persistence.
///
/// Lookups return `None` for absent and soft-deleted orders; absence is an
/// expected outcome, not an error. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Finds a live order by its ID.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Finds a live order by its tracking code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Order>>;

    /// Returns true if any order, including a soft-deleted one, holds `code`.
    async fn exists_by_code(&self, code: &str) -> Result<bool>;

    /// Inserts a new `Pending` order and returns the stored record.
    ///
    /// Fails with `DuplicateCode` if the code is already taken. The store
    /// enforces this itself, so concurrent inserts of the same code cannot
    /// both succeed.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    /// Applies `patch` to a live order and returns the updated record.
    ///
    /// Returns None if the order does not exist or was soft-deleted. If
    /// `options.expected_status` is set and the order is in another status,
    /// fails with `StatusConflict` and leaves the order untouched.
    async fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
        options: UpdateOptions,
    ) -> Result<Option<Order>>;

    /// Marks a live order as deleted. Returns false if there was nothing to delete.
    async fn soft_delete(&self, id: OrderId) -> Result<bool>;

    /// Lists live orders matching `query`, newest first.
    async fn search(&self, query: OrderQuery) -> Result<Page<Order>>;

    /// Counts live orders per status.
    async fn statistics(&self) -> Result<OrderStatistics>;
}

/// Extension trait providing convenience methods for order repositories.
#[async_trait]
pub trait OrderRepositoryExt: OrderRepository {
    /// Moves a live order from `from` to `to`, failing with `StatusConflict`
    /// if someone else moved it first.
    async fn transition_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>> {
        self.update(id, OrderPatch::status(to), UpdateOptions::expect_status(from))
            .await
    }
}

// Blanket implementation for all OrderRepository implementations
impl<T: OrderRepository + ?Sized> OrderRepositoryExt for T {}
