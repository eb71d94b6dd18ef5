//! Clock abstractions used by the suspension store and abuse governor.
//!
//! Suspension deadlines live in a single monotonic millisecond domain so they can
//! be compared and stored as plain `u64`s. Injecting the clock keeps deadline
//! logic deterministic in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock abstraction so timing can be faked in tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Milliseconds elapsed in this clock's domain.
    fn now_millis(&self) -> u64;
}

/// Monotonic clock backed by `Instant::now()`.
///
/// Notes: resets when the process restarts, which is fine here since rate-limit
/// state is not persisted across restarts.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones share the same underlying time, so a clock handed to a dispatcher can
/// still be advanced from the test body (or by a [`ManualSleeper`]).
///
/// [`ManualSleeper`]: crate::sleeper::ManualSleeper
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let delta = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
