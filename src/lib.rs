#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Routegate
//!
//! Client-side dispatcher for REST APIs that enforce server-defined rate
//! limits. Many concurrent callers submit requests; routegate serializes the
//! ones that share a rate-limit bucket, waits out server-communicated
//! cool-downs, retries transient 429s transparently, and applies hard
//! backpressure before the client misbehaves badly enough to get banned.
//!
//! ## What it does
//!
//! - **Bucket keying**: [`RouteKey`] groups requests by method, endpoint
//!   template, and major path parameter, the same grouping the server bills
//!   against.
//! - **Suspension tracking**: [`SuspensionStore`] holds per-route and global
//!   "do not send before" deadlines fed by response headers.
//! - **Abuse governor**: [`AbuseGovernor`] caps how often rate-limit
//!   violations may occur per window; exhaustion stalls callers instead of
//!   failing them.
//! - **Dispatch orchestration**: [`Dispatcher::submit`] runs the
//!   lock → throttle → send → classify loop; callers only ever see the final
//!   response or a terminal error.
//!
//! The HTTP transport is injected behind the [`Transport`] trait; routegate
//! does no socket handling, TLS, pooling, or host balancing of its own.
//!
//! ## Quick start
//!
//! ```rust
//! use routegate::{ApiRequest, ApiResponse, Dispatcher, Method, RouteKey, Transport, TransportError};
//!
//! struct StubTransport;
//!
//! #[async_trait::async_trait]
//! impl Transport for StubTransport {
//!     async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
//!         Ok(ApiResponse::new(200))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dispatcher = Dispatcher::builder(StubTransport).build().unwrap();
//!
//! let route = RouteKey::new(Method::Get, "/channels/{channel.id}/messages").with_major(42);
//! let response = dispatcher
//!     .submit(ApiRequest::new(route, "/channels/42/messages"))
//!     .await
//!     .unwrap();
//! assert_eq!(response.status(), 200);
//! # });
//! ```

pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod governor;
pub mod headers;
pub mod route;
pub mod sleeper;
pub mod suspension;
pub mod transport;

// Re-exports
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use dispatcher::{BuildError, Dispatcher, DispatcherBuilder};
pub use error::{DispatchError, TransportError};
pub use governor::{AbuseGovernor, GovernorConfig};
pub use headers::RateLimitInfo;
pub use route::{Method, RouteKey};
pub use sleeper::{ManualSleeper, Sleeper, TokioSleeper};
pub use suspension::SuspensionStore;
pub use transport::{ApiRequest, ApiResponse, Transport};
