// src/core/limits.rs — Run-scoped execution budgets

use std::collections::HashMap;
use std::fmt;

/// Named run-scoped budget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    /// Commits created during this run.
    CommitsPerRun,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::CommitsPerRun => write!(f, "commits-per-run"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Budget {
    max: u64,
    used: u64,
}

/// Counters for run-bounded quantities. Budgets only ever shrink during a
/// run; an untracked limit is unlimited.
#[derive(Debug, Default)]
pub struct Limits {
    budgets: HashMap<Limit, Budget>,
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, limit: Limit, max: u64) {
        self.budgets.insert(limit, Budget { max, used: 0 });
    }

    /// Remaining budget, or `None` when the limit is not configured.
    pub fn remaining(&self, limit: Limit) -> Option<u64> {
        self.budgets
            .get(&limit)
            .map(|budget| budget.max.saturating_sub(budget.used))
    }

    pub fn consume(&mut self, limit: Limit, amount: u64) {
        if let Some(budget) = self.budgets.get_mut(&limit) {
            budget.used = budget.used.saturating_add(amount);
        }
    }

    /// True when a configured budget has run out. Exhaustion is an expected
    /// loop-termination condition, never an error.
    pub fn is_exhausted(&self, limit: Limit) -> bool {
        matches!(self.remaining(limit), Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_limit_is_unlimited() {
        let limits = Limits::new();
        assert_eq!(limits.remaining(Limit::CommitsPerRun), None);
        assert!(!limits.is_exhausted(Limit::CommitsPerRun));
    }

    #[test]
    fn consume_shrinks_remaining() {
        let mut limits = Limits::new();
        limits.set(Limit::CommitsPerRun, 3);
        limits.consume(Limit::CommitsPerRun, 2);
        assert_eq!(limits.remaining(Limit::CommitsPerRun), Some(1));
        assert!(!limits.is_exhausted(Limit::CommitsPerRun));
    }

    #[test]
    fn exhaustion_at_zero_remaining() {
        let mut limits = Limits::new();
        limits.set(Limit::CommitsPerRun, 1);
        limits.consume(Limit::CommitsPerRun, 1);
        assert!(limits.is_exhausted(Limit::CommitsPerRun));
    }

    #[test]
    fn zero_budget_starts_exhausted() {
        let mut limits = Limits::new();
        limits.set(Limit::CommitsPerRun, 0);
        assert!(limits.is_exhausted(Limit::CommitsPerRun));
    }

    #[test]
    fn overconsumption_saturates() {
        let mut limits = Limits::new();
        limits.set(Limit::CommitsPerRun, 1);
        limits.consume(Limit::CommitsPerRun, 5);
        assert_eq!(limits.remaining(Limit::CommitsPerRun), Some(0));
    }

    #[test]
    fn consuming_untracked_limit_is_a_noop() {
        let mut limits = Limits::new();
        limits.consume(Limit::CommitsPerRun, 5);
        assert_eq!(limits.remaining(Limit::CommitsPerRun), None);
    }
}
