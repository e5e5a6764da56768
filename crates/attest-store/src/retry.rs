//! Bounded retry budget for optimistic commits
//!
//! Callers run a read-modify-commit loop against the store; when a commit
//! conflicts they spend one unit of budget and re-read. A persistent
//! conflict exhausts the budget and surfaces as `TransientStore`, which
//! the caller may retry from scratch where the operation is idempotent.

use attest_core::{AttestError, Result};

/// Default number of commit attempts before giving up
pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 3;

/// Tracks how many conflicting commit attempts remain
#[derive(Debug)]
pub struct RetryBudget {
    total: u32,
    remaining: u32,
}

impl RetryBudget {
    /// Budget allowing `attempts` total commit attempts (minimum one)
    pub fn new(attempts: u32) -> Self {
        let total = attempts.max(1);
        Self {
            total,
            remaining: total - 1,
        }
    }

    /// Spend one retry after a conflicting commit
    ///
    /// Returns `TransientStore` once the budget is exhausted.
    pub fn spend(&mut self, operation: &str) -> Result<()> {
        if self.remaining == 0 {
            return Err(AttestError::transient_store(format!(
                "{operation}: gave up after {} conflicting commit attempts",
                self.total
            )));
        }
        self.remaining -= 1;
        tracing::debug!(
            operation,
            remaining = self.remaining,
            "commit conflicted; retrying against fresh state"
        );
        Ok(())
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn budget_allows_attempts_minus_one_retries() {
        let mut budget = RetryBudget::new(3);
        assert!(budget.spend("op").is_ok());
        assert!(budget.spend("op").is_ok());
        assert_matches!(budget.spend("op"), Err(AttestError::TransientStore { .. }));
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let mut budget = RetryBudget::new(0);
        assert_matches!(budget.spend("op"), Err(AttestError::TransientStore { .. }));
    }
}
