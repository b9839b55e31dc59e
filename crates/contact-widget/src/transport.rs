//! Submission transport

use async_trait::async_trait;
use contact_common::SubmissionPayload;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Response of the submission endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    /// 2xx status and `success: true` in the body
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.body.get("success") == Some(&Value::Bool(true))
    }

    /// Server-supplied error text, if non-empty
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

/// Transport-level failures, distinct from application-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl TransportError {
    /// Guidance shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Connect(_) => {
                "Unable to connect to the server. Please check if the site is properly deployed."
            }
            Self::Request(_) => "Network error. Please check your internet connection.",
            Self::Network(_) | Self::InvalidBody(_) => {
                "Network error. Please check your connection and try again."
            }
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_timeout() || err.is_request() {
            Self::Request(err.to_string())
        } else if err.is_decode() {
            Self::InvalidBody(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait SubmitTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError>;
}

/// JSON-over-HTTP transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn with_timeout(timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> SubmissionPayload {
        let mut payload = SubmissionPayload::new();
        payload.insert("name", "Ada");
        payload.insert("newsletter", false);
        payload
    }

    #[tokio::test]
    async fn test_posts_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "name": "Ada", "newsletter": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "id": "p1" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = HttpTransport::new()
            .post_json(&format!("{}/submit", server.uri()), &payload())
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({ "error": "Too many requests." })))
            .mount(&server)
            .await;

        let response = HttpTransport::new().post_json(&server.uri(), &payload()).await.unwrap();

        assert_eq!(response.status, 429);
        assert!(!response.is_success());
        assert_eq!(response.error_message(), Some("Too many requests."));
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = HttpTransport::new().post_json(&server.uri(), &payload()).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        let err = HttpTransport::new()
            .post_json("http://127.0.0.1:9/submit", &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
        assert!(err.user_message().starts_with("Unable to connect"));
    }

    #[test]
    fn test_success_requires_flag_and_2xx() {
        let ok = TransportResponse { status: 200, body: json!({ "success": true }) };
        let flag_false = TransportResponse { status: 200, body: json!({ "success": false }) };
        let bad_status = TransportResponse { status: 500, body: json!({ "success": true }) };
        assert!(ok.is_success());
        assert!(!flag_false.is_success());
        assert!(!bad_status.is_success());
    }
}
