//! Order status state machine.

use common::OrderStatus;

use super::OrderError;

/// Legal status moves for an order.
///
/// ```text
/// Pending ──► Verification ──► Processing ──► Approval ──► Running ──► Completed
/// ```
///
/// Every move is one step forward. There are no backward or skipping moves,
/// and `Completed` is terminal.
pub struct OrderLifecycle;

impl OrderLifecycle {
    /// Returns the statuses an order in `current` may move to next.
    pub fn next_options(current: OrderStatus) -> &'static [OrderStatus] {
        match current {
            OrderStatus::Pending => &[OrderStatus::Verification],
            OrderStatus::Verification => &[OrderStatus::Processing],
            OrderStatus::Processing => &[OrderStatus::Approval],
            OrderStatus::Approval => &[OrderStatus::Running],
            OrderStatus::Running => &[OrderStatus::Completed],
            OrderStatus::Completed => &[],
        }
    }

    /// Returns true if `current -> target` is a legal move.
    pub fn can_transition(current: OrderStatus, target: OrderStatus) -> bool {
        Self::next_options(current).contains(&target)
    }

    /// Checks a move, failing with `IllegalTransition` if it is not allowed.
    pub fn validate(current: OrderStatus, target: OrderStatus) -> Result<(), OrderError> {
        if Self::can_transition(current, target) {
            Ok(())
        } else {
            Err(OrderError::IllegalTransition {
                from: current,
                to: target,
            })
        }
    }

    /// Returns true if no further moves are possible.
    pub fn is_terminal(current: OrderStatus) -> bool {
        Self::next_options(current).is_empty()
    }

    /// Completion percentage shown to customers. Display only.
    pub fn progress(current: OrderStatus) -> u8 {
        match current {
            OrderStatus::Pending => 0,
            OrderStatus::Verification => 15,
            OrderStatus::Processing => 35,
            OrderStatus::Approval => 55,
            OrderStatus::Running => 75,
            OrderStatus::Completed => 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_state_has_single_forward_step() {
        let all = OrderStatus::ALL;
        for pair in all.windows(2) {
            assert_eq!(OrderLifecycle::next_options(pair[0]), &[pair[1]]);
        }
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(OrderLifecycle::next_options(OrderStatus::Completed).is_empty());
        assert!(OrderLifecycle::is_terminal(OrderStatus::Completed));
        for status in &OrderStatus::ALL[..5] {
            assert!(!OrderLifecycle::is_terminal(*status));
        }
    }

    #[test]
    fn test_validate_full_grid() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let legal = OrderLifecycle::next_options(from).contains(&to);
                let result = OrderLifecycle::validate(from, to);
                assert_eq!(result.is_ok(), legal, "{from} -> {to}");
                if !legal {
                    assert!(matches!(
                        result,
                        Err(OrderError::IllegalTransition { from: f, to: t }) if f == from && t == to
                    ));
                }
            }
        }
    }

    #[test]
    fn test_no_backward_or_skip_moves() {
        assert!(!OrderLifecycle::can_transition(
            OrderStatus::Pending,
            OrderStatus::Processing
        ));
        assert!(!OrderLifecycle::can_transition(
            OrderStatus::Running,
            OrderStatus::Approval
        ));
        assert!(!OrderLifecycle::can_transition(
            OrderStatus::Verification,
            OrderStatus::Verification
        ));
    }

    #[test]
    fn test_progress_mapping() {
        let progress: Vec<u8> = OrderStatus::ALL
            .into_iter()
            .map(OrderLifecycle::progress)
            .collect();
        assert_eq!(progress, vec![0, 15, 35, 55, 75, 100]);
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = OrderLifecycle::validate(OrderStatus::Pending, OrderStatus::Processing)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal status transition: cannot move from pending to processing"
        );
    }
}
