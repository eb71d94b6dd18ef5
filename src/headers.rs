//! Rate-limit header interpretation.
//!
//! The remote API annotates responses with bucket bookkeeping. All delay values
//! are millisecond deltas relative to response receipt (the client negotiates
//! millisecond precision), which keeps the arithmetic inside one monotonic clock
//! domain instead of trusting the server's wall clock.

use std::time::Duration;

use crate::transport::ApiResponse;

/// `true` when the limit that was hit applies to every route, not just this one.
pub const HEADER_GLOBAL: &str = "x-ratelimit-global";
/// Requests left in this route's bucket; `0` means the next send must wait.
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
/// Milliseconds until this route's bucket refills.
pub const HEADER_RESET_AFTER: &str = "x-ratelimit-reset-after";
/// Milliseconds to wait before retrying; attached to 429s.
pub const HEADER_RETRY_AFTER: &str = "retry-after";

/// Rate-limit bookkeeping carried on one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub global: bool,
    pub remaining: Option<u64>,
    pub reset_after: Option<Duration>,
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Parse whatever rate-limit headers are present; absent or malformed
    /// headers read as "not provided".
    pub fn from_response(response: &ApiResponse) -> Self {
        Self {
            global: response
                .header(HEADER_GLOBAL)
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            remaining: parse_u64(response, HEADER_REMAINING),
            reset_after: parse_millis(response, HEADER_RESET_AFTER),
            retry_after: parse_millis(response, HEADER_RETRY_AFTER),
        }
    }

    /// The route's bucket has no requests left; the next send must wait.
    pub fn bucket_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// How long this route should stay suspended. Prefers the bucket's refill
    /// delta, falling back to the retry-after a 429 carries.
    pub fn route_delay(&self) -> Option<Duration> {
        self.reset_after.or(self.retry_after)
    }

    /// Whether this response signals a rate limit at all. A bare remaining
    /// count above zero is ordinary bookkeeping and does not count.
    pub fn carries_rate_limit(&self) -> bool {
        self.global || self.bucket_exhausted() || self.retry_after.is_some()
    }
}

fn parse_u64(response: &ApiResponse, name: &str) -> Option<u64> {
    response.header(name).and_then(|value| value.trim().parse().ok())
}

fn parse_millis(response: &ApiResponse, name: &str) -> Option<Duration> {
    parse_u64(response, name).map(Duration::from_millis)
}
