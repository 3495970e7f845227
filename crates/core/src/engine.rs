//! The request-routing engine: classification dispatch and the four fetch
//! strategies.
//!
//! Every strategy has the same outward shape: (request, bound store, optional
//! cap) → eventual outcome, never panicking and never surfacing a cache miss
//! as an error. Failure handling differs per strategy and the differences are
//! the contract:
//!
//! - cache-first (strict): network failure propagates. Used only for static
//!   assets expected to have been provisioned already.
//! - cache-first-with-fallback: total failure degrades to a synthetic
//!   503 "Offline" response, so a navigation always renders something.
//! - stale-while-revalidate: the background refresh leg never fails the
//!   caller; its errors go to the refresh sink.
//! - network-first-with-fallback: total failure is [`Outcome::Absent`], NOT
//!   a synthetic response. The asymmetry with the HTML strategy is a known
//!   quirk, kept deliberately; see DESIGN.md.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{evict, CachedResponse, Request, StoreSet};
use crate::classify::{Route, Router};
use crate::config::EngineConfig;
use crate::Error;

/// The live-fetch primitive.
///
/// Implementations fail only with [`Error::Network`] on transport-level
/// problems; an HTTP error status is a successful fetch. No implementation
/// times out on its own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, req: &Request) -> Result<CachedResponse, Error>;
}

/// Failure sink for detached background refreshes.
///
/// The stale-while-revalidate refresh is fire-and-forget relative to the
/// already-answered caller; whatever it fails with lands here instead of
/// being silently swallowed by the scheduler.
pub type RefreshSink = Arc<dyn Fn(&Request, &Error) + Send + Sync>;

fn default_refresh_sink() -> RefreshSink {
    Arc::new(|req, err| {
        tracing::warn!(url = %req.url, error = %err, "background refresh failed");
    })
}

/// Result of handling one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Non-GET request: not intercepted, the host passes it through.
    Bypass,
    /// A response from cache, network, or a synthetic offline page.
    Response(CachedResponse),
    /// Network-first total failure with no cached copy. A found-or-not-found
    /// result, not an error.
    Absent,
}

/// The caching engine: one instance serves all concurrent handlers.
pub struct Engine {
    stores: StoreSet,
    fetcher: Arc<dyn Fetcher>,
    router: Router,
    refresh_sink: RefreshSink,
}

impl Engine {
    pub fn new(stores: StoreSet, fetcher: Arc<dyn Fetcher>, config: &EngineConfig) -> Self {
        Self {
            stores,
            fetcher,
            router: Router::from_config(config),
            refresh_sink: default_refresh_sink(),
        }
    }

    /// Replace the background-refresh failure sink (used by tests and hosts
    /// that route refresh failures into their own telemetry).
    pub fn with_refresh_sink(mut self, sink: RefreshSink) -> Self {
        self.refresh_sink = sink;
        self
    }

    pub fn stores(&self) -> &StoreSet {
        &self.stores
    }

    /// Classify and serve one inbound request.
    pub async fn handle(&self, req: &Request) -> Result<Outcome, Error> {
        match self.router.classify(req) {
            Route::Skip => Ok(Outcome::Bypass),
            Route::CacheFirst { store } => self.cache_first(req, &store).await.map(Outcome::Response),
            Route::CacheFirstWithFallback { store } => {
                self.cache_first_with_fallback(req, &store).await.map(Outcome::Response)
            }
            Route::StaleWhileRevalidate { store, cap } => {
                self.stale_while_revalidate(req, &store, cap).await.map(Outcome::Response)
            }
            Route::NetworkFirst { store } => Ok(self
                .network_first(req, &store)
                .await?
                .map_or(Outcome::Absent, Outcome::Response)),
        }
    }

    /// Strict cache-first: single-store lookup, network on miss, no fallback.
    ///
    /// A hit never touches the network; the static store is assumed rarely
    /// stale. On miss, a network failure propagates to the caller.
    async fn cache_first(&self, req: &Request, store: &str) -> Result<CachedResponse, Error> {
        let key = req.key();
        if let Some(cached) = self.stores.match_in(store, &key).await? {
            return Ok(cached);
        }

        let fresh = self.fetcher.fetch(req).await?;
        self.stores.put(store, &key, &fresh).await?;
        Ok(fresh)
    }

    /// Navigational cache-first: any-store lookup, network on miss, and a
    /// synthetic offline page on total failure.
    async fn cache_first_with_fallback(&self, req: &Request, store: &str) -> Result<CachedResponse, Error> {
        let key = req.key();
        if let Some(cached) = self.stores.match_any(&key).await? {
            return Ok(cached);
        }

        match self.fetcher.fetch(req).await {
            Ok(fresh) => {
                self.stores.put(store, &key, &fresh).await?;
                Ok(fresh)
            }
            Err(e) if e.is_network() => {
                tracing::debug!(url = %req.url, error = %e, "navigation offline, serving synthetic response");
                Ok(CachedResponse::offline())
            }
            Err(e) => Err(e),
        }
    }

    /// Serve cached immediately if present; refresh from the network either
    /// way, evicting past the cap after the write.
    ///
    /// On a hit the refresh runs as a detached task and its failures are
    /// routed to the refresh sink. On a miss the refresh IS the caller's
    /// response, so its failures (network and store alike) propagate.
    async fn stale_while_revalidate(&self, req: &Request, store: &str, cap: usize) -> Result<CachedResponse, Error> {
        let key = req.key();
        let cached = self.stores.match_in(store, &key).await?;

        let stores = self.stores.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let store_name = store.to_string();
        let refresh_req = req.clone();
        let refresh = async move {
            let fresh = fetcher.fetch(&refresh_req).await?;
            stores.put(&store_name, &refresh_req.key(), &fresh).await?;
            evict::clean(&stores, &store_name, cap).await?;
            Ok::<CachedResponse, Error>(fresh)
        };

        match cached {
            Some(resp) => {
                let sink = Arc::clone(&self.refresh_sink);
                let req = req.clone();
                tokio::spawn(async move {
                    if let Err(e) = refresh.await {
                        sink(&req, &e);
                    }
                });
                Ok(resp)
            }
            None => refresh.await,
        }
    }

    /// Live fetch first; on network failure fall back to the bound store.
    ///
    /// Returns Ok(None) when the fetch fails and no cached copy exists. This
    /// is deliberately NOT the synthetic offline response the HTML strategy
    /// serves; see the module docs.
    async fn network_first(&self, req: &Request, store: &str) -> Result<Option<CachedResponse>, Error> {
        let key = req.key();
        match self.fetcher.fetch(req).await {
            Ok(fresh) => {
                self.stores.put(store, &key, &fresh).await?;
                Ok(Some(fresh))
            }
            Err(e) if e.is_network() => {
                tracing::debug!(url = %req.url, error = %e, "live fetch failed, falling back to cache");
                self.stores.match_in(store, &key).await
            }
            Err(e) => Err(e),
        }
    }
}
