//! Order status values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stage an order has reached.
///
/// Variants are declared in lifecycle order, so the derived `Ord` sorts
/// statuses from `Pending` to `Completed`. Which moves between them are legal
/// is decided by the domain lifecycle, not here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted by the customer, not yet looked at.
    #[default]
    Pending,
    Verification,
    Processing,
    Approval,
    Running,
    /// Work delivered (terminal).
    Completed,
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Verification,
        OrderStatus::Processing,
        OrderStatus::Approval,
        OrderStatus::Running,
        OrderStatus::Completed,
    ];

    /// Returns the persisted/wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Verification => "verification",
            OrderStatus::Processing => "processing",
            OrderStatus::Approval => "approval",
            OrderStatus::Running => "running",
            OrderStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Returned when a string does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);
