//! Request classification into strategy buckets.
//!
//! The router is an ordered list of (predicate, route) rules evaluated top to
//! bottom; the first match wins. The ordering is a correctness decision, not
//! an accident: navigational HTML must be caught before the static-extension
//! rule, and backend traffic must be caught before the JSON rule, or those
//! requests would land in the wrong store with the wrong failure behavior.

use crate::cache::Request;
use crate::config::EngineConfig;

/// Recognized stylesheet/script/font extensions served cache-first from the
/// static store.
const STATIC_EXTENSIONS: &[&str] = &["js", "css", "woff", "woff2", "ttf", "eot", "otf"];

/// The strategy a request is routed to, with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Pass through untouched; the engine never intercepts non-GET traffic.
    Skip,
    /// Live fetch first, cache fallback on network failure.
    NetworkFirst { store: String },
    /// Any-store lookup first, then network, then a synthetic offline page.
    CacheFirstWithFallback { store: String },
    /// Serve cached immediately, refresh in the background.
    StaleWhileRevalidate { store: String, cap: usize },
    /// Single-store lookup first; network failure propagates.
    CacheFirst { store: String },
}

type Predicate = Box<dyn Fn(&Request) -> bool + Send + Sync>;

struct Rule {
    name: &'static str,
    matches: Predicate,
    route: Route,
}

/// Ordered routing table, built once from configuration.
pub struct Router {
    rules: Vec<Rule>,
}

impl Router {
    pub fn from_config(config: &EngineConfig) -> Self {
        let backend_domains = config.backend_domains.clone();
        let rules = vec![
            Rule {
                name: "bypass-non-get",
                matches: Box::new(|req| !req.is_get()),
                route: Route::Skip,
            },
            Rule {
                name: "backend-api",
                matches: Box::new(move |req| {
                    req.url
                        .host_str()
                        .is_some_and(|host| backend_domains.iter().any(|d| host.contains(d.as_str())))
                }),
                route: Route::NetworkFirst { store: config.runtime_store.clone() },
            },
            Rule {
                name: "navigation-html",
                matches: Box::new(|req| req.accepts("text/html")),
                route: Route::CacheFirstWithFallback { store: config.runtime_store.clone() },
            },
            Rule {
                name: "json-api",
                matches: Box::new(|req| req.accepts("application/json")),
                route: Route::StaleWhileRevalidate {
                    store: config.runtime_store.clone(),
                    cap: config.runtime_cap,
                },
            },
            Rule {
                name: "static-asset",
                matches: Box::new(|req| {
                    req.url
                        .path()
                        .rsplit_once('.')
                        .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                }),
                route: Route::CacheFirst { store: config.static_store.clone() },
            },
            Rule {
                name: "image",
                matches: Box::new(|req| req.accepts("image")),
                route: Route::StaleWhileRevalidate {
                    store: config.images_store.clone(),
                    cap: config.images_cap,
                },
            },
            Rule {
                name: "default",
                matches: Box::new(|_| true),
                route: Route::NetworkFirst { store: config.runtime_store.clone() },
            },
        ];

        Self { rules }
    }

    /// Route a request. The trailing catch-all rule guarantees a match.
    pub fn classify(&self, req: &Request) -> Route {
        for rule in &self.rules {
            if (rule.matches)(req) {
                tracing::debug!(rule = rule.name, method = %req.method, url = %req.url, "classified request");
                return rule.route.clone();
            }
        }
        unreachable!("catch-all rule always matches")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn router() -> Router {
        let config = EngineConfig {
            backend_domains: vec!["api.example-backend.io".into()],
            ..Default::default()
        };
        Router::from_config(&config)
    }

    fn get(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_non_get_skips() {
        let mut req = get("https://app.example.com/catalog.json");
        req.method = "POST".into();
        req = req.with_header("accept", "application/json");
        assert_eq!(router().classify(&req), Route::Skip);
    }

    #[test]
    fn test_backend_routes_network_first() {
        let req = get("https://api.example-backend.io/rest/v1/items");
        assert_eq!(
            router().classify(&req),
            Route::NetworkFirst { store: "outpost-runtime-v1".into() }
        );
    }

    #[test]
    fn test_backend_wins_over_json_accept() {
        // the backend rule sits above the JSON rule: a JSON request to the
        // backend must prefer live data, not stale-while-revalidate
        let req = get("https://api.example-backend.io/rest/v1/items").with_header("accept", "application/json");
        assert!(matches!(router().classify(&req), Route::NetworkFirst { .. }));
    }

    #[test]
    fn test_html_routes_cache_first_with_fallback() {
        let req = get("https://app.example.com/").with_header("accept", "text/html,application/xhtml+xml");
        assert_eq!(
            router().classify(&req),
            Route::CacheFirstWithFallback { store: "outpost-runtime-v1".into() }
        );
    }

    #[test]
    fn test_html_wins_over_static_extension() {
        // a navigation to /docs/page.js-style URLs must still get the offline
        // fallback, not the strict static strategy
        let req = get("https://app.example.com/guide.js").with_header("accept", "text/html");
        assert!(matches!(router().classify(&req), Route::CacheFirstWithFallback { .. }));
    }

    #[test]
    fn test_json_routes_stale_while_revalidate() {
        let req = get("https://app.example.com/catalog.json").with_header("accept", "application/json");
        assert_eq!(
            router().classify(&req),
            Route::StaleWhileRevalidate { store: "outpost-runtime-v1".into(), cap: 50 }
        );
    }

    #[test]
    fn test_static_extensions_route_cache_first() {
        for path in ["/app.js", "/style.css", "/font.woff", "/font.woff2", "/font.ttf", "/font.eot", "/font.otf"] {
            let req = get(&format!("https://app.example.com{path}"));
            assert_eq!(
                router().classify(&req),
                Route::CacheFirst { store: "outpost-static-v1".into() },
                "path {path}"
            );
        }
    }

    #[test]
    fn test_image_routes_stale_while_revalidate() {
        let req = get("https://cdn.example.com/photo").with_header("accept", "image/avif,image/webp,*/*");
        assert_eq!(
            router().classify(&req),
            Route::StaleWhileRevalidate { store: "outpost-images-v1".into(), cap: 50 }
        );
    }

    #[test]
    fn test_default_routes_network_first() {
        let req = get("https://app.example.com/opaque");
        assert_eq!(
            router().classify(&req),
            Route::NetworkFirst { store: "outpost-runtime-v1".into() }
        );
    }

    #[test]
    fn test_unknown_extension_falls_through() {
        let req = get("https://app.example.com/archive.zip");
        assert!(matches!(router().classify(&req), Route::NetworkFirst { .. }));
    }
}
