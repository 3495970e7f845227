//! Push-notification relay contract.
//!
//! A push message body decodes to `{"notification": {"title"?, "body"?},
//! "data": {"url"?}}`. Decoding is total: a malformed or empty body is a
//! no-op, never a failed event. Each decoded payload produces exactly one
//! displayed notification; a click focuses an open client view whose URL
//! matches the target exactly, or opens a new view at that URL. No retry, no
//! queuing.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::Error;

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(default)]
    notification: Option<PushFields>,
    #[serde(default)]
    data: Option<PushData>,
}

#[derive(Debug, Deserialize)]
struct PushFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushData {
    #[serde(default)]
    url: Option<String>,
}

/// A fully-defaulted notification, ready to display. Ephemeral: constructed
/// from one push message, consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Click target, carried with the displayed notification.
    pub target_url: String,
}

/// Decode a push message body, applying configured defaults.
///
/// Returns None for an empty or undecodable body; the push handler must
/// no-op rather than fail the event.
pub fn decode(body: &[u8], config: &EngineConfig) -> Option<Notification> {
    if body.is_empty() {
        return None;
    }

    let payload: PushPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable push payload");
            return None;
        }
    };

    let fields = payload.notification.unwrap_or(PushFields { title: None, body: None });
    Some(Notification {
        title: fields.title.unwrap_or_else(|| config.app_name.clone()),
        body: fields.body.unwrap_or_else(|| config.default_notification_body.clone()),
        target_url: payload
            .data
            .and_then(|d| d.url)
            .unwrap_or_else(|| config.default_click_url.clone()),
    })
}

/// Host-side notification display surface.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
}

/// Handle one push event: decode and show at most one notification.
///
/// Returns true if a notification was shown.
pub fn handle_push(body: &[u8], config: &EngineConfig, sink: &dyn NotificationSink) -> bool {
    match decode(body, config) {
        Some(notification) => {
            sink.show(notification);
            true
        }
        None => false,
    }
}

/// An open client view, as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientView {
    pub id: String,
    pub url: String,
}

/// Host-side window/view surface used for click routing.
#[async_trait]
pub trait ClientViews: Send + Sync {
    async fn list(&self) -> Result<Vec<ClientView>, Error>;
    async fn focus(&self, id: &str) -> Result<(), Error>;
    async fn open(&self, url: &str) -> Result<(), Error>;
}

/// How a notification click was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An already-open view with the exact target URL was focused.
    Focused(String),
    /// No view matched; a new one was opened at the target URL.
    Opened,
}

/// Route a notification click: focus an exact-URL match, else open new.
pub async fn route_click(target_url: &str, views: &dyn ClientViews) -> Result<ClickOutcome, Error> {
    for view in views.list().await? {
        if view.url == target_url {
            views.focus(&view.id).await?;
            return Ok(ClickOutcome::Focused(view.id));
        }
    }

    views.open(target_url).await?;
    Ok(ClickOutcome::Opened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn config() -> EngineConfig {
        EngineConfig { app_name: "Outpost".into(), ..Default::default() }
    }

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<Notification>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, notification: Notification) {
            self.shown.lock().unwrap().push(notification);
        }
    }

    struct FakeViews {
        views: Vec<ClientView>,
        focused: Mutex<Vec<String>>,
        opened: Mutex<Vec<String>>,
    }

    impl FakeViews {
        fn new(views: Vec<ClientView>) -> Self {
            Self { views, focused: Mutex::new(Vec::new()), opened: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ClientViews for FakeViews {
        async fn list(&self) -> Result<Vec<ClientView>, Error> {
            Ok(self.views.clone())
        }

        async fn focus(&self, id: &str) -> Result<(), Error> {
            self.focused.lock().unwrap().push(id.to_string());
            Ok(())
        }

        async fn open(&self, url: &str) -> Result<(), Error> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_decode_full_payload() {
        let body = br#"{"notification":{"title":"Sale","body":"50% off"},"data":{"url":"/sale"}}"#;
        let n = decode(body, &config()).unwrap();
        assert_eq!(n.title, "Sale");
        assert_eq!(n.body, "50% off");
        assert_eq!(n.target_url, "/sale");
    }

    #[test]
    fn test_decode_applies_defaults() {
        // title given, body and url defaulted
        let body = br#"{"notification":{"title":"Sale"},"data":{"url":"/sale"}}"#;
        let n = decode(body, &config()).unwrap();
        assert_eq!(n.title, "Sale");
        assert_eq!(n.body, "New update available");
        assert_eq!(n.target_url, "/sale");

        let n = decode(br#"{}"#, &config()).unwrap();
        assert_eq!(n.title, "Outpost");
        assert_eq!(n.body, "New update available");
        assert_eq!(n.target_url, "/");
    }

    #[test]
    fn test_malformed_payload_is_noop() {
        let sink = RecordingSink::default();
        assert!(!handle_push(b"", &config(), &sink));
        assert!(!handle_push(b"not json", &config(), &sink));
        assert!(!handle_push(br#"["array"]"#, &config(), &sink));
        assert!(sink.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_push_shows_exactly_one() {
        let sink = RecordingSink::default();
        let body = br#"{"notification":{"title":"Sale"},"data":{"url":"/sale"}}"#;
        assert!(handle_push(body, &config(), &sink));

        let shown = sink.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Sale");
    }

    #[tokio::test]
    async fn test_click_focuses_exact_match() {
        let views = FakeViews::new(vec![
            ClientView { id: "a".into(), url: "/".into() },
            ClientView { id: "b".into(), url: "/sale".into() },
        ]);

        let outcome = route_click("/sale", &views).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Focused("b".into()));
        assert_eq!(*views.focused.lock().unwrap(), vec!["b".to_string()]);
        assert!(views.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_opens_when_no_exact_match() {
        // prefix match is not a match; the comparison is exact
        let views = FakeViews::new(vec![ClientView { id: "a".into(), url: "/sale/archive".into() }]);

        let outcome = route_click("/sale", &views).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened);
        assert_eq!(*views.opened.lock().unwrap(), vec!["/sale".to_string()]);
        assert!(views.focused.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_opens_when_no_views() {
        let views = FakeViews::new(vec![]);
        assert_eq!(route_click("/sale", &views).await.unwrap(), ClickOutcome::Opened);
    }
}
