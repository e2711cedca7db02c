use std::collections::BTreeMap;

use serde::Serialize;

use crate::OrderStatus;

/// Per-status order counts for the admin dashboard.
///
/// Soft-deleted orders are not counted. Every status has an entry, even
/// when its count is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    pub by_status: BTreeMap<OrderStatus, u64>,
    pub total: u64,
    /// Orders that have not reached `Completed`.
    pub active: u64,
}

impl OrderStatistics {
    /// Builds statistics from `(status, count)` pairs. Repeated statuses are summed.
    pub fn from_counts(counts: impl IntoIterator<Item = (OrderStatus, u64)>) -> Self {
        let mut by_status: BTreeMap<OrderStatus, u64> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for (status, count) in counts {
            *by_status.entry(status).or_default() += count;
        }

        let total = by_status.values().sum();
        let active = total - by_status[&OrderStatus::Completed];

        Self {
            by_status,
            total,
            active,
        }
    }

    pub fn count(&self, status: OrderStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

impl Default for OrderStatistics {
    fn default() -> Self {
        Self::from_counts([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statistics_are_zero_filled() {
        let stats = OrderStatistics::default();
        assert_eq!(stats.by_status.len(), OrderStatus::ALL.len());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn active_excludes_completed() {
        let stats = OrderStatistics::from_counts([
            (OrderStatus::Pending, 2),
            (OrderStatus::Running, 1),
            (OrderStatus::Completed, 4),
            (OrderStatus::Pending, 1),
        ]);

        assert_eq!(stats.count(OrderStatus::Pending), 3);
        assert_eq!(stats.count(OrderStatus::Approval), 0);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.active, 4);
    }
}
