//! Abstraction for cooperative waits.
//!
//! Throttle delays and governor stalls go through a [`Sleeper`] so tests can run
//! deadline logic without real time passing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::clock::ManualClock;

/// Abstraction for suspending the current task for a duration.
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Production sleeper using the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test sleeper that records every sleep and advances a shared [`ManualClock`]
/// instead of waiting.
///
/// Advancing the clock matters for deadline logic: code that sleeps until a
/// suspension point and then re-reads the clock sees the deadline as passed,
/// exactly as it would in real time.
#[derive(Debug, Clone)]
pub struct ManualSleeper {
    clock: ManualClock,
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl ManualSleeper {
    pub fn new(clock: ManualClock) -> Self {
        Self { clock, calls: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Every duration passed to [`Sleeper::sleep`], in call order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }

    /// Total time slept so far.
    pub fn total_slept(&self) -> Duration {
        self.calls.lock().unwrap().iter().sum()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Sleeper for ManualSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.calls.lock().unwrap().push(duration);
        self.clock.advance(duration);
        Box::pin(async {})
    }
}
