//! Contact Form Submission Handler
//!
//! Receives contact form posts and records them as Notion database pages.
//!
//! ```text
//!   POST /.netlify/functions/submit-contact
//!        │
//!        ▼
//!   ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌───────────┐
//!   │  method  │──►│ rate limit │──►│ payload │──►│  CAPTCHA  │
//!   └──────────┘   └────────────┘   └─────────┘   └─────┬─────┘
//!                                                       ▼
//!   ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌───────────┐
//!   │  Notion  │◄──│  mapping   │◄──│  email  │◄──│ sanitize  │
//!   └──────────┘   └────────────┘   └─────────┘   └───────────┘
//! ```
//!
//! External services sit behind [`RecordStore`], [`CaptchaVerifier`] and
//! [`RateLimiter`] so the pipeline can run against in-memory fakes.

pub mod captcha;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod notion;
pub mod rate_limit;
pub mod routes;
pub mod sanitize;

use axum::http::{header, HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use contact_common::SUBMIT_CONTACT_PATH;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use captcha::{CaptchaVerifier, RecaptchaVerifier};
pub use config::{ConfigError, HandlerConfig, NotionCredentials};
pub use error::HandlerError;
pub use notion::{NotionClient, RecordStore, StoreError};
pub use rate_limit::{RateLimitConfig, RateLimitResult, RateLimiter, SlidingWindowLimiter};

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Absent when Notion credentials are not configured
    pub store: Option<Arc<dyn RecordStore>>,
    /// Absent when no CAPTCHA secret is configured
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            store: None,
            captcha: None,
            limiter,
        }
    }

    /// Wire up the real adapters from configuration
    pub fn from_config(config: &HandlerConfig) -> std::result::Result<Self, ConfigError> {
        let mut state = Self::new(Arc::new(SlidingWindowLimiter::new(&config.rate_limit)));

        match config.notion_credentials() {
            Some(credentials) => {
                state.store = Some(Arc::new(NotionClient::new(credentials, &config.notion_api_url)?));
            }
            None => tracing::error!("Missing Notion environment variables, submissions will fail"),
        }

        if let Some(secret) = config.recaptcha_secret() {
            state.captcha = Some(Arc::new(RecaptchaVerifier::new(secret, &config.recaptcha_verify_url)?));
        } else {
            tracing::warn!("RECAPTCHA_SECRET_KEY not set, CAPTCHA verification disabled");
        }

        Ok(state)
    }

    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_captcha(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha = Some(verifier);
        self
    }
}

/// Build the handler router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(SUBMIT_CONTACT_PATH, any(routes::submit::submit_contact))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(86_400))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(details = %details, "Handler panicked");
    HandlerError::Internal(details).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_empty_config_has_no_store() {
        let state = AppState::from_config(&HandlerConfig::default()).unwrap();
        assert!(state.store.is_none());
        assert!(state.captcha.is_none());
    }

    #[test]
    fn test_state_from_full_config() {
        let config = HandlerConfig {
            notion_api_key: Some("secret_abc".into()),
            notion_database_id: Some("db-1".into()),
            recaptcha_secret_key: Some("s3cret".into()),
            ..HandlerConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(state.store.is_some());
        assert!(state.captcha.is_some());
    }

    #[test]
    fn test_state_ignores_empty_credentials() {
        let config = HandlerConfig {
            notion_api_key: Some(String::new()),
            notion_database_id: Some("db-1".into()),
            recaptcha_secret_key: Some(String::new()),
            ..HandlerConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(state.store.is_none());
        assert!(state.captcha.is_none());
    }

    #[test]
    fn test_panic_response_shape() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
