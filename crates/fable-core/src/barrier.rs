//! The turn barrier.
//!
//! Counts completed actions for the current day and releases once the
//! count reaches the number of registered agents. The registered count is
//! passed in at every check rather than cached, so an agent that joins
//! mid-day is counted from the next check on.
//!
//! The barrier does no locking of its own. It lives inside an
//! [`Environment`](crate::environment::Environment), whose mutex makes the
//! increment-compare-reset sequence atomic.

/// Completed-action counter for one environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnBarrier {
    acted: usize,
}

impl TurnBarrier {
    /// A barrier with no completed actions.
    pub const fn new() -> Self {
        Self { acted: 0 }
    }

    /// Completed actions recorded for the current day.
    pub const fn acted(&self) -> usize {
        self.acted
    }

    /// Record one completed action. Returns `true` when the barrier
    /// releases, in which case the count is already back at zero.
    pub fn record(&mut self, registered: usize) -> bool {
        self.acted = self.acted.saturating_add(1);
        debug_assert!(
            registered == 0 || self.acted <= registered,
            "acted count {} exceeds registered agents {registered}",
            self.acted
        );
        self.check(registered)
    }

    /// Forget one completed action, for an agent that acted and then left.
    pub fn forget(&mut self) {
        debug_assert!(self.acted > 0, "forgetting an action that was never recorded");
        self.acted = self.acted.saturating_sub(1);
    }

    /// Release if every registered agent has acted. An empty environment
    /// never releases.
    pub const fn check(&mut self, registered: usize) -> bool {
        if registered > 0 && self.acted >= registered {
            self.acted = 0;
            return true;
        }
        false
    }
}
