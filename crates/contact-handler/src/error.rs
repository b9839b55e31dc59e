//! Handler errors and their HTTP mapping

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contact_common::ErrorBody;
use std::time::Duration;
use thiserror::Error;

use crate::notion::StoreError;

/// Every way a submission can fail
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Notion configuration missing. Please set NOTION_API_KEY and NOTION_DATABASE_ID environment variables.")]
    MissingConfiguration,

    #[error("Too many requests. Please wait before submitting again.")]
    RateLimited { retry_after: Duration },

    #[error("No form data received.")]
    EmptyPayload,

    #[error("Invalid JSON in request body.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("CAPTCHA verification failed. Please try again.")]
    CaptchaFailed,

    #[error("Invalid email format.")]
    InvalidEmail,

    /// Error reported by the record store, mirrored to the caller
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(String),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingConfiguration | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::EmptyPayload | Self::InvalidJson(_) | Self::CaptchaFailed | Self::InvalidEmail => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream { status, .. } => *status,
        }
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Api { status, message } => Self::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Internal(details) => ErrorBody::with_details(self.to_string(), details.clone()),
            _ => ErrorBody::new(self.to_string()),
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited { retry_after } = &self {
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HandlerError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(HandlerError::MissingConfiguration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(HandlerError::EmptyPayload.status(), StatusCode::BAD_REQUEST);
        assert_eq!(HandlerError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HandlerError::RateLimited { retry_after: Duration::from_secs(1) }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_store_api_error_is_mirrored() {
        let err: HandlerError = StoreError::Api { status: 404, message: "Could not find database".into() }.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Could not find database");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = HandlerError::RateLimited { retry_after: Duration::from_millis(1500) }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }
}
