//! Abuse governor: a fixed-window token bucket capping how often the remote API
//! may flag this client for exceeding a rate limit.
//!
//! Every 429 (and every error response that also carries a rate-limit flag)
//! costs one token, whatever route it came from. Draining the bucket means the
//! client is violating limits fast enough to risk a ban, so [`consume`] turns
//! into hard backpressure: the caller stalls until the window rolls over. It is
//! never an error.
//!
//! The window mutex is held across the stall on purpose: once the budget is
//! gone, every consumer queues behind the rollover.
//!
//! [`consume`]: AbuseGovernor::consume

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;

use crate::clock::Clock;
use crate::sleeper::Sleeper;

/// Capacity and refill window for the [`AbuseGovernor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorConfig {
    /// Rate-limit hits tolerated per window.
    pub capacity: u64,
    /// Window length; the full capacity becomes available again when it rolls
    /// over.
    pub window: Duration,
}

impl Default for GovernorConfig {
    /// Server policy constants: 25 000 violations per 10 minutes.
    fn default() -> Self {
        Self { capacity: 25_000, window: Duration::from_secs(10 * 60) }
    }
}

#[derive(Debug)]
struct WindowState {
    consumed: u64,
    /// Clock millis at which the current window ends; 0 before first use.
    window_end: u64,
}

/// Fixed-window token bucket with stalling (not failing) exhaustion semantics.
#[derive(Debug)]
pub struct AbuseGovernor {
    config: GovernorConfig,
    state: Mutex<WindowState>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl AbuseGovernor {
    pub fn new(config: GovernorConfig, clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            config,
            state: Mutex::new(WindowState { consumed: 0, window_end: 0 }),
            clock,
            sleeper,
        }
    }

    pub fn config(&self) -> GovernorConfig {
        self.config
    }

    /// Deduct one token, first waiting out the window if the budget is gone.
    pub async fn consume(&self) {
        let mut state = self.state.lock().await;

        let now = self.clock.now_millis();
        if now >= state.window_end {
            self.reset(&mut state, now);
        }

        if state.consumed >= self.config.capacity {
            let stall = Duration::from_millis(state.window_end - now);
            warn!(
                capacity = self.config.capacity,
                stall_ms = stall.as_millis() as u64,
                "abuse budget exhausted, stalling until the window rolls over"
            );
            self.sleeper.sleep(stall).await;
            let now = self.clock.now_millis();
            self.reset(&mut state, now);
        }

        state.consumed += 1;
    }

    fn reset(&self, state: &mut WindowState, now: u64) {
        let window = u64::try_from(self.config.window.as_millis()).unwrap_or(u64::MAX);
        state.window_end = now.saturating_add(window);
        state.consumed = 0;
    }
}
