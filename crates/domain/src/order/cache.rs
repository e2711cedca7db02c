//! Cache invalidation hook.
//!
//! Public pages cache order listings and tracking lookups. The service does
//! not know about any concrete cache; it reports which tags went stale after
//! each successful write.

/// Something a cache may hold that order writes can make stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Admin listings and search results.
    OrderList,
    /// Dashboard counters.
    OrderStatistics,
    /// Tracking lookups for one code.
    Order(String),
}

/// Receives invalidation requests after order writes.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, tags: &[CacheTag]);
}

/// Invalidator for deployments without a cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _tags: &[CacheTag]) {}
}
