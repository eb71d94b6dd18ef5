//! Error types for request dispatch.
//!
//! Only terminal outcomes surface here. Transient rate limits are resolved
//! internally by retrying after the server's cool-down, and abuse backpressure
//! stalls the attempt instead of failing it; callers see neither.

use thiserror::Error;

/// Terminal failure of one submitted request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The remote API rejected the request (non-rate-limit 4xx/5xx). Status and
    /// body pass through untouched so callers can map them to domain errors.
    #[error("request failed with status {status}: {}", String::from_utf8_lossy(.body))]
    Request { status: u16, body: Vec<u8> },

    /// The transport failed before a response was obtained. Not retried here;
    /// transport-level retry is the caller's policy to layer on.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    pub(crate) fn request(status: u16, body: Vec<u8>) -> Self {
        Self::Request { status, body }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Status code of a rejected request, if this is a `Request` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Response body of a rejected request, if this is a `Request` error.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Request { body, .. } => Some(body.as_slice()),
            Self::Transport(_) => None,
        }
    }
}

/// Failure inside the injected HTTP transport: no response was produced.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
