//! Request dispatcher: serializes attempts per route, waits out suspension
//! windows, and transparently retries transiently rate-limited requests.
//!
//! Semantics:
//! - One lock per [`RouteKey`], created lazily and shared across attempts. The
//!   lock is held for the whole attempt, throttle wait included, so attempts
//!   on one route are serialized end-to-end and nothing slips in during another
//!   attempt's cooldown. Tokio's mutex is fair, so same-route requests are sent
//!   in acquisition order. Different routes never contend.
//! - A response flagged global records the global deadline whatever its
//!   status; an exhausted bucket records the per-route deadline, 2xx included.
//! - A 429 charges the abuse governor and re-enters the loop. Retries are
//!   unbounded; they are paced by the freshly recorded deadlines, so the loop
//!   cannot spin.
//! - Any other 4xx/5xx surfaces immediately as [`DispatchError::Request`]; if
//!   it also carries a rate-limit flag it still charges the governor first.
//! - Transport failures surface as [`DispatchError::Transport`], no retry.
//!
//! Invariants:
//! - At most one route lock is held per attempt, so no lock-ordering deadlock.
//! - Dropping the returned future releases the route lock via guard drop;
//!   shared deadlines are single `u64` writes and never partially visible.
//! - The governor is charged exactly once per rate-limited attempt and never
//!   for ordinary successes or ordinary errors.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::error::DispatchError;
use crate::governor::{AbuseGovernor, GovernorConfig};
use crate::headers::RateLimitInfo;
use crate::route::RouteKey;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::suspension::SuspensionStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Outcome of classifying one attempt's response.
enum Outcome {
    Done(ApiResponse),
    Failed(DispatchError),
    Retry,
}

/// Rate-limit-aware dispatcher around an injected HTTP transport.
///
/// Callers hand in an [`ApiRequest`] via [`submit`] and get back the final
/// response or a terminal error; retries, locks, and suspension bookkeeping
/// never show through.
///
/// [`submit`]: Dispatcher::submit
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    suspensions: SuspensionStore,
    governor: AbuseGovernor,
    locks: Mutex<HashMap<RouteKey, Arc<AsyncMutex<()>>>>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transport", &"<transport>")
            .field("suspensions", &self.suspensions)
            .field("governor", &self.governor)
            .field("clock", &self.clock)
            .field("sleeper", &self.sleeper)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Construct a builder around the injected transport.
    pub fn builder(transport: impl Transport + 'static) -> DispatcherBuilder {
        DispatcherBuilder::new(transport)
    }

    /// Dispatch one request, retrying transient rate limits until it lands.
    ///
    /// Resolves to the first terminal outcome: a non-rate-limited response, a
    /// rejected request, or a transport failure. May suspend while waiting for
    /// the route lock, a suspension window, or abuse backpressure.
    pub async fn submit(&self, request: ApiRequest) -> Result<ApiResponse, DispatchError> {
        let route = request.route().clone();
        let mut attempt: u32 = 1;

        loop {
            let lock = self.route_lock(&route);
            let _guard = lock.lock().await;

            self.throttle(&route).await;

            trace!(request = %request.log_string(), attempt, "sending");
            let response = self.transport.send(&request).await?;
            trace!(request = %request.log_string(), status = response.status(), "received");

            match self.classify(&route, response).await {
                Outcome::Done(response) => return Ok(response),
                Outcome::Failed(error) => return Err(error),
                Outcome::Retry => attempt += 1,
            }
            // _guard drops here; the retry re-queues behind other waiters.
        }
    }

    fn route_lock(&self, route: &RouteKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        Arc::clone(locks.entry(route.clone()).or_default())
    }

    /// Wait out the global and per-route suspension deadlines, clearing each
    /// once passed. Runs under the route lock.
    async fn throttle(&self, route: &RouteKey) {
        let global = self.suspensions.global_suspension();
        if global != 0 {
            let now = self.clock.now_millis();
            if global > now {
                trace!(route = %route, wait_ms = global - now, "waiting out global suspension");
                self.sleeper.sleep(Duration::from_millis(global - now)).await;
            }
            if self.clock.now_millis() >= global {
                self.suspensions.clear_global_suspension(global);
            }
        }

        if let Some(deadline) = self.suspensions.suspension_for(route) {
            let now = self.clock.now_millis();
            if deadline > now {
                trace!(route = %route, wait_ms = deadline - now, "waiting out route suspension");
                self.sleeper.sleep(Duration::from_millis(deadline - now)).await;
            }
            self.suspensions.clear_suspension(route, deadline);
        }
    }

    /// Record any suspension the response mandates, charge the governor where
    /// a rate limit was hit, and decide how the attempt ends.
    async fn classify(&self, route: &RouteKey, response: ApiResponse) -> Outcome {
        let info = RateLimitInfo::from_response(&response);
        let now = self.clock.now_millis();

        // The global flag can ride on any status, not just a 429; both the
        // global and the per-route deadline may be recorded for one response.
        if info.global {
            let delay = info.retry_after.or(info.reset_after).unwrap_or_default();
            let deadline = now.saturating_add(as_millis(delay));
            debug!(deadline_ms = deadline, "global rate limit hit, suspending all routes");
            self.suspensions.set_global_suspension(deadline);
        }

        if info.bucket_exhausted() || (response.is_rate_limited() && !info.global) {
            if let Some(delay) = info.route_delay() {
                let deadline = now.saturating_add(as_millis(delay));
                debug!(route = %route, deadline_ms = deadline, "route bucket exhausted, suspending route");
                self.suspensions.set_suspension(route, deadline);
            }
        }

        if response.is_rate_limited() {
            self.governor.consume().await;
            return Outcome::Retry;
        }

        if response.is_error() {
            if info.carries_rate_limit() {
                self.governor.consume().await;
            }
            return Outcome::Failed(DispatchError::request(response.status(), response.into_body()));
        }

        Outcome::Done(response)
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`Dispatcher`].
///
/// The transport is required up front; governor constants, clock, and sleeper
/// have production defaults and are injectable for tests.
pub struct DispatcherBuilder {
    transport: Arc<dyn Transport>,
    governor: GovernorConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

/// Errors produced while building a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Governor capacity must be > 0.
    #[error("governor capacity must be > 0")]
    InvalidGovernorCapacity,
    /// Governor window must be non-zero.
    #[error("governor window must be non-zero")]
    InvalidGovernorWindow,
}

impl DispatcherBuilder {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            governor: GovernorConfig::default(),
            clock: Arc::new(MonotonicClock::default()),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Override the abuse governor's capacity and window.
    pub fn governor(mut self, config: GovernorConfig) -> Self {
        self.governor = config;
        self
    }

    /// Provide a custom clock implementation.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the dispatcher, validating governor constants.
    pub fn build(self) -> Result<Dispatcher, BuildError> {
        if self.governor.capacity == 0 {
            return Err(BuildError::InvalidGovernorCapacity);
        }
        if self.governor.window.is_zero() {
            return Err(BuildError::InvalidGovernorWindow);
        }
        Ok(Dispatcher {
            governor: AbuseGovernor::new(
                self.governor,
                Arc::clone(&self.clock),
                Arc::clone(&self.sleeper),
            ),
            transport: self.transport,
            suspensions: SuspensionStore::new(),
            locks: Mutex::new(HashMap::new()),
            clock: self.clock,
            sleeper: self.sleeper,
        })
    }
}
