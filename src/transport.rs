//! Request/response surface and the injected HTTP transport.
//!
//! The dispatcher treats a request as an opaque routable unit: a route key, a
//! rendered path, and optional body bytes. What the body encodes is the caller's
//! business. The actual wire work (sockets, TLS, pooling) lives behind the
//! [`Transport`] trait and is supplied at construction.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::route::RouteKey;

/// One outgoing request: where it goes and what it carries.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    route: RouteKey,
    path: String,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// `path` is the rendered path the transport should hit; `route` is the
    /// bucket identity (template plus major parameter) used for rate limiting.
    pub fn new(route: RouteKey, path: impl Into<String>) -> Self {
        Self { route, path: path.into(), body: None }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn route(&self) -> &RouteKey {
        &self.route
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub(crate) fn log_string(&self) -> String {
        format!("{} {}", self.route.method(), self.path)
    }
}

/// The slice of an HTTP response the dispatcher needs: status, headers, body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16) -> Self {
        Self { status, headers: HashMap::new(), body: Vec::new() }
    }

    /// Header names are stored lower-cased so lookups are case-insensitive.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Any 4xx/5xx.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// HTTP 429.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Injected HTTP transport.
///
/// Implementations own connection handling and request encoding; the dispatcher
/// only calls `send` and reads the result. A transport error means no response
/// was obtained (connection refused, reset mid-flight, etc.); responses with
/// error statuses come back as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
