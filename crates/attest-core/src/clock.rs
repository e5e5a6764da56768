//! Time source abstraction
//!
//! Components take a `Clock` rather than reading system time directly, so
//! tests can pin or advance time deterministically.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" for registry and ledger operations
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as unix milliseconds
    async fn now_ms(&self) -> u64;
}

/// Production clock backed by system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for SystemClock {
    #[allow(clippy::disallowed_methods)]
    async fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

/// Manually driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock pinned at the given unix-millis instant
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Move the clock to an absolute instant
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Advance the clock by a delta
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_clock_advances_deterministically() {
        let clock = ManualClock::at(1_000);
        assert_eq!(clock.now_ms().await, 1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms().await, 1_500);
        clock.set(10);
        assert_eq!(clock.now_ms().await, 10);
    }
}
