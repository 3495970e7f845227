//! Live-fetch primitive backed by reqwest.
//!
//! `HttpFetcher` is the network leg of every strategy. Its contract mirrors
//! the engine's [`Fetcher`] trait: transport-level failures (connectivity
//! loss, DNS failure, abort) surface as `Error::Network`; an HTTP error
//! status is a successful fetch and is returned as-is for the engine to
//! store or serve.
//!
//! No request timeout is set: a live fetch that never resolves leaves the
//! calling strategy pending, matching the engine's concurrency contract.
//! A configurable timeout here is a known hardening opportunity.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use outpost_core::{CachedResponse, Error, Fetcher, Request};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// User agent string (default: "outpost/0.1")
    pub user_agent: String,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self { user_agent: "outpost/0.1".to_string(), max_redirects: 5 }
    }
}

/// HTTP implementation of the engine's live-fetch seam.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, req: &Request) -> Result<CachedResponse, Error> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|e| Error::Network(format!("invalid method {}: {e}", req.method)))?;

        let mut request = self.http.request(method, req.url.as_str());
        for (name, value) in &req.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("fetch failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(url = %req.url, status, bytes = body.len(), "fetched");

        Ok(CachedResponse { status, headers, body })
    }
}
