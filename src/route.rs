//! Route identity for rate-limit bucketing.
//!
//! The remote API counts requests against buckets keyed by method, endpoint
//! template, and (for many endpoint families) a "major" path parameter: a
//! resource id that scopes the bucket to one channel, guild, etc. [`RouteKey`]
//! mirrors that grouping client-side: two requests share a key iff the server
//! would count them against the same bucket.

use std::borrow::Cow;
use std::fmt;

/// HTTP methods used by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of the rate-limit bucket a request counts against.
///
/// Pure value type, built once per outgoing request. Equality and hashing cover
/// method, template, and major parameter, so the same endpoint template against
/// two different resources lands in two different buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    template: Cow<'static, str>,
    major: Option<u64>,
}

impl RouteKey {
    /// Key for a route without a major parameter.
    ///
    /// `template` is the endpoint template with placeholders intact (e.g.
    /// `/channels/{channel.id}/messages`), not the rendered path.
    pub fn new(method: Method, template: impl Into<Cow<'static, str>>) -> Self {
        Self { method, template: template.into(), major: None }
    }

    /// Scope the key to a major path parameter.
    pub fn with_major(mut self, major: u64) -> Self {
        self.major = Some(major);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn major(&self) -> Option<u64> {
        self.major
    }
}

// Display is used in trace logs; keep it one line.
impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)?;
        if let Some(major) = self.major {
            write!(f, " (major {major})")?;
        }
        Ok(())
    }
}
