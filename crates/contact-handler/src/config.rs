//! Handler configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::captcha::RECAPTCHA_VERIFY_URL;
use crate::notion::NOTION_API_URL;
use crate::rate_limit::RateLimitConfig;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Notion integration token
    pub notion_api_key: Option<String>,
    /// Target Notion database
    pub notion_database_id: Option<String>,
    /// Notion API base URL
    pub notion_api_url: String,
    /// Bot-verification server secret
    pub recaptcha_secret_key: Option<String>,
    /// Bot-verification endpoint
    pub recaptcha_verify_url: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            notion_api_key: None,
            notion_database_id: None,
            notion_api_url: NOTION_API_URL.into(),
            recaptcha_secret_key: None,
            recaptcha_verify_url: RECAPTCHA_VERIFY_URL.into(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Both halves of the Notion credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionCredentials {
    pub api_key: String,
    pub database_id: String,
}

impl HandlerConfig {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`. Empty values count as unset.
    pub fn apply_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = var("NOTION_API_KEY") {
            self.notion_api_key = Some(value);
        }
        if let Some(value) = var("NOTION_DATABASE_ID") {
            self.notion_database_id = Some(value);
        }
        if let Some(value) = var("NOTION_API_URL") {
            self.notion_api_url = value;
        }
        if let Some(value) = var("RECAPTCHA_SECRET_KEY") {
            self.recaptcha_secret_key = Some(value);
        }
        if let Some(value) = var("RECAPTCHA_VERIFY_URL") {
            self.recaptcha_verify_url = value;
        }
        if let Some(value) = var("RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "RATE_LIMIT_WINDOW_MS", value })?;
        }
        if let Some(value) = var("RATE_LIMIT_MAX_REQUESTS") {
            self.rate_limit.max_requests = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "RATE_LIMIT_MAX_REQUESTS", value })?;
        }
        Ok(self)
    }

    /// Present only when both the key and the database id are set
    pub fn notion_credentials(&self) -> Option<NotionCredentials> {
        let api_key = non_empty(&self.notion_api_key)?;
        let database_id = non_empty(&self.notion_database_id)?;
        Some(NotionCredentials {
            api_key: api_key.to_string(),
            database_id: database_id.to_string(),
        })
    }

    pub fn recaptcha_secret(&self) -> Option<&str> {
        non_empty(&self.recaptcha_secret_key)
    }

    /// Log which settings are present without revealing them
    pub fn log_summary(&self) {
        let flag = |present: bool| if present { "[SET]" } else { "[NOT SET]" };
        tracing::info!(
            bind_addr = %self.bind_addr,
            notion_api_key = flag(is_set(&self.notion_api_key)),
            notion_database_id = flag(is_set(&self.notion_database_id)),
            recaptcha_secret_key = flag(self.recaptcha_secret().is_some()),
            rate_limit_window_ms = self.rate_limit.window_ms,
            rate_limit_max_requests = self.rate_limit.max_requests,
            "Handler configuration"
        );
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn is_set(value: &Option<String>) -> bool {
    non_empty(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HandlerConfig::default();
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(config.notion_credentials().is_none());
    }

    #[test]
    fn test_env_overlay() {
        let config = HandlerConfig::default()
            .apply_vars(vars(&[
                ("NOTION_API_KEY", "secret_abc"),
                ("NOTION_DATABASE_ID", "db-1"),
                ("RECAPTCHA_SECRET_KEY", ""),
                ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ]))
            .unwrap();

        assert_eq!(
            config.notion_credentials(),
            Some(NotionCredentials { api_key: "secret_abc".into(), database_id: "db-1".into() })
        );
        assert!(config.recaptcha_secret().is_none());
        assert_eq!(config.rate_limit.max_requests, 10);
    }

    #[test]
    fn test_credentials_need_both_halves() {
        let config = HandlerConfig::default()
            .apply_vars(vars(&[("NOTION_API_KEY", "secret_abc")]))
            .unwrap();
        assert!(config.notion_credentials().is_none());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = HandlerConfig::default()
            .apply_vars(vars(&[("RATE_LIMIT_WINDOW_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "RATE_LIMIT_WINDOW_MS", .. }));
    }

    #[test]
    fn test_empty_file_values_count_as_unset() {
        let config: HandlerConfig = serde_json::from_str(
            r#"{ "notion_api_key": "", "notion_database_id": "db-1", "recaptcha_secret_key": "" }"#,
        )
        .unwrap();

        assert!(!is_set(&config.notion_api_key));
        assert!(is_set(&config.notion_database_id));
        assert!(config.notion_credentials().is_none());
        assert!(config.recaptcha_secret().is_none());
    }

    #[test]
    fn test_partial_json_file_uses_defaults() {
        let config: HandlerConfig =
            serde_json::from_str(r#"{ "bind_addr": "127.0.0.1:3000" }"#).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.notion_api_url, NOTION_API_URL);
    }
}
