//! Configuration validation rules.
//!
//! Validation runs after values have been loaded from environment, file, or
//! defaults, before the engine is constructed.

use crate::config::EngineConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl EngineConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a store name is empty or two stores share a name
    /// - a cap is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in [
            ("static_store", &self.static_store),
            ("runtime_store", &self.runtime_store),
            ("images_store", &self.images_store),
        ] {
            if name.is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        let names = self.current_stores();
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(ConfigError::Invalid {
                field: "static_store/runtime_store/images_store".into(),
                reason: "store names must be distinct".into(),
            });
        }

        if self.runtime_cap == 0 {
            return Err(ConfigError::Invalid { field: "runtime_cap".into(), reason: "must be greater than 0".into() });
        }
        if self.images_cap == 0 {
            return Err(ConfigError::Invalid { field: "images_cap".into(), reason: "must be greater than 0".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for name in names {
            if !name.starts_with(&self.store_prefix) {
                tracing::warn!(
                    store = name,
                    prefix = self.store_prefix,
                    "store name outside the configured prefix will never be retired"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_store_name() {
        let config = EngineConfig { static_store: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "static_store"));
    }

    #[test]
    fn test_validate_duplicate_store_names() {
        let config = EngineConfig {
            runtime_store: "outpost-static-v1".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_cap() {
        let config = EngineConfig { runtime_cap: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "runtime_cap"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = EngineConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
