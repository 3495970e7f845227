//! Request and response types shared by the classifier, strategies, and stores.
//!
//! A response body here is fully-buffered `Bytes`, so cloning a
//! [`CachedResponse`] is cheap and both the caller and the store receive an
//! independent handle to the same immutable payload. This is the type-level
//! rendering of "clone before store, return the other": there is no drained
//! stream to hand out by accident.

use bytes::Bytes;
use url::Url;

/// An observed inbound request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method, e.g. "GET". Only GET requests are ever cached.
    pub method: String,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Build a GET request with no headers.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".to_string(), url, headers: Vec::new() }
    }

    /// Add a header, returning the modified request (builder style).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// First header value with the given name, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the Accept header declares the given content class.
    ///
    /// Substring match, mirroring how browsers send composite Accept values
    /// like `text/html,application/xhtml+xml,...`.
    pub fn accepts(&self, needle: &str) -> bool {
        self.header("accept").is_some_and(|v| v.contains(needle))
    }

    /// Cache identity for store lookups.
    pub fn key(&self) -> RequestKey {
        RequestKey { method: self.method.to_uppercase(), url: self.url.to_string() }
    }
}

/// Cache identity of a request: the (method, URL) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

/// A response as held by the stores and returned by strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Add a header, returning the modified response (builder style).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Synthetic offline response: status 503, plain-text body "Offline".
    ///
    /// Fabricated locally, never read from cache or network. Served when a
    /// navigational request fails with no cached copy anywhere.
    pub fn offline() -> Self {
        CachedResponse::new(503, "Offline").with_header("content-type", "text/plain")
    }

    /// First header value with the given name, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
