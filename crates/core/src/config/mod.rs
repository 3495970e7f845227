//! Engine configuration with layered loading.
//!
//! Store names, caps, and routing inputs are injected here rather than baked
//! into constants, so a host can version its stores (and tests can use
//! throwaway names) without touching the engine. Loading is layered via
//! figment:
//!
//! 1. Environment variables (OUTPOST_*)
//! 2. TOML config file (if OUTPOST_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Engine configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OUTPOST_*)
/// 2. TOML config file (if OUTPOST_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the SQLite database backing all stores.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the static-assets store (pre-populated at provisioning time,
    /// treated as rarely stale by the strict cache-first strategy).
    #[serde(default = "default_static_store")]
    pub static_store: String,

    /// Name of the runtime store (JSON revalidation target, fallback/write
    /// store for backend and default-strategy traffic).
    #[serde(default = "default_runtime_store")]
    pub runtime_store: String,

    /// Name of the images store.
    #[serde(default = "default_images_store")]
    pub images_store: String,

    /// Entry cap for the runtime store.
    #[serde(default = "default_cap")]
    pub runtime_cap: usize,

    /// Entry cap for the images store.
    #[serde(default = "default_cap")]
    pub images_cap: usize,

    /// Store-name prefix owned by this application. Lifecycle retirement only
    /// ever deletes stores under this prefix.
    #[serde(default = "default_store_prefix")]
    pub store_prefix: String,

    /// Remote-backend domains whose traffic is routed network-first.
    /// Matched as a suffix/substring of the request host.
    #[serde(default)]
    pub backend_domains: Vec<String>,

    /// Static asset URLs fetched into the static store at provisioning time.
    #[serde(default)]
    pub static_assets: Vec<String>,

    /// Application name, used as the default push-notification title.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Default push-notification body when the payload carries none.
    #[serde(default = "default_notification_body")]
    pub default_notification_body: String,

    /// Default click target when the payload carries no URL.
    #[serde(default = "default_click_url")]
    pub default_click_url: String,

    /// User-Agent string for live fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./outpost-cache.sqlite")
}

fn default_static_store() -> String {
    "outpost-static-v1".into()
}

fn default_runtime_store() -> String {
    "outpost-runtime-v1".into()
}

fn default_images_store() -> String {
    "outpost-images-v1".into()
}

fn default_cap() -> usize {
    50
}

fn default_store_prefix() -> String {
    "outpost-".into()
}

fn default_app_name() -> String {
    "Outpost".into()
}

fn default_notification_body() -> String {
    "New update available".into()
}

fn default_click_url() -> String {
    "/".into()
}

fn default_user_agent() -> String {
    "outpost/0.1".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            static_store: default_static_store(),
            runtime_store: default_runtime_store(),
            images_store: default_images_store(),
            runtime_cap: default_cap(),
            images_cap: default_cap(),
            store_prefix: default_store_prefix(),
            backend_domains: Vec::new(),
            static_assets: Vec::new(),
            app_name: default_app_name(),
            default_notification_body: default_notification_body(),
            default_click_url: default_click_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl EngineConfig {
    /// The three store names currently in service.
    pub fn current_stores(&self) -> [&str; 3] {
        [&self.static_store, &self.runtime_store, &self.images_store]
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OUTPOST_`
    /// 2. TOML file from `OUTPOST_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OUTPOST_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OUTPOST_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
