//! Efficy module configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secret::SecretString;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("efficy.{0} is required")]
    MissingField(&'static str),
}

/// Efficy module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EfficyConfig {
    // === Upstream ===
    /// CRM origin, e.g. `https://crm.example.com`.
    pub server: String,
    /// Application context segment, e.g. `crm`.
    pub app_context: String,
    /// API version segment, e.g. `v1`.
    pub version: String,
    /// Static `Authorization` value sent upstream.
    pub token: SecretString,

    // === Resource namespaces ===
    pub advanced_resource: String,
    pub base_resource: String,
    pub service_resource: String,
    /// Path below the base namespace serving reference tables.
    pub referential_path: String,

    // === Timeouts ===
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,

    // === Paging ===
    pub max_page_size: u32,
    pub default_page_size: u32,

    // === Identity ===
    /// Forward the caller's own `Authorization` header instead of `token`.
    pub forward_client_authorization: bool,
    /// Header carrying the caller email, both inbound and upstream.
    pub identity_header: String,
}

impl Default for EfficyConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            app_context: String::new(),
            version: String::new(),
            token: SecretString::default(),

            advanced_resource: String::new(),
            base_resource: String::new(),
            service_resource: String::new(),
            referential_path: "referential".to_owned(),

            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,

            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,

            forward_client_authorization: false,
            identity_header: "X-User-Email".to_owned(),
        }
    }
}

impl EfficyConfig {
    /// Check that every upstream coordinate is set.
    ///
    /// # Errors
    /// Returns the first required field that is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("server", self.server.as_str()),
            ("app_context", self.app_context.as_str()),
            ("version", self.version.as_str()),
            ("advanced_resource", self.advanced_resource.as_str()),
            ("base_resource", self.base_resource.as_str()),
            ("service_resource", self.service_resource.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingField(*name));
        }
        if self.token.is_blank() {
            return Err(ConfigError::MissingField("token"));
        }
        Ok(())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(positive_or(self.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS))
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(positive_or(self.read_timeout_ms, DEFAULT_READ_TIMEOUT_MS))
    }

    #[must_use]
    pub fn effective_max_page_size(&self) -> u32 {
        positive_or(self.max_page_size, DEFAULT_MAX_PAGE_SIZE)
    }

    /// Default page size, never above the maximum.
    #[must_use]
    pub fn effective_default_page_size(&self) -> u32 {
        positive_or(self.default_page_size, DEFAULT_PAGE_SIZE).min(self.effective_max_page_size())
    }
}

fn positive_or<T: PartialOrd + Default>(value: T, fallback: T) -> T {
    if value > T::default() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> EfficyConfig {
        EfficyConfig {
            server: "https://crm.example.com".to_owned(),
            app_context: "crm".to_owned(),
            version: "v1".to_owned(),
            token: SecretString::new("Basic abc"),
            advanced_resource: "advanced".to_owned(),
            base_resource: "base".to_owned(),
            service_resource: "service".to_owned(),
            ..EfficyConfig::default()
        }
    }

    #[test]
    fn defaults() {
        let cfg = EfficyConfig::default();
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.read_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.effective_max_page_size(), 100);
        assert_eq!(cfg.effective_default_page_size(), 20);
        assert_eq!(cfg.identity_header, "X-User-Email");
        assert!(!cfg.forward_client_authorization);
    }

    #[test]
    fn validate_reports_first_missing_field() {
        assert!(valid().validate().is_ok());

        let cfg = EfficyConfig {
            app_context: "  ".to_owned(),
            ..valid()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::MissingField("app_context")));

        let cfg = EfficyConfig {
            token: SecretString::default(),
            ..valid()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::MissingField("token")));
    }

    #[test]
    fn non_positive_values_fall_back() {
        let cfg = EfficyConfig {
            connect_timeout_ms: 0,
            max_page_size: 0,
            default_page_size: 500,
            ..valid()
        };
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.effective_max_page_size(), 100);
        assert_eq!(cfg.effective_default_page_size(), 100);
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let err = serde_json::from_value::<EfficyConfig>(serde_json::json!({"servr": "x"}));
        assert!(err.is_err());

        let cfg: EfficyConfig =
            serde_json::from_value(serde_json::json!({"server": "https://x", "token": "t"}))
                .unwrap();
        assert_eq!(cfg.server, "https://x");
        assert_eq!(cfg.token.expose(), "t");
        assert_eq!(cfg.read_timeout_ms, 10_000);
    }
}
