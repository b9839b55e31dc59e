//! Bot verification

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// reCAPTCHA server-side verification endpoint
pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Server-side check of a client CAPTCHA token
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `true` only when the provider accepts the token
    async fn verify(&self, token: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// reCAPTCHA verifier
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        })
    }

    async fn request(&self, token: &str) -> Result<VerifyResponse, reqwest::Error> {
        self.client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .json::<VerifyResponse>()
            .await
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> bool {
        match self.request(token).await {
            Ok(response) => {
                if !response.success {
                    tracing::info!(error_codes = ?response.error_codes, "CAPTCHA token rejected");
                }
                response.success
            }
            Err(e) => {
                tracing::error!(error = %e, "CAPTCHA verification error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier_for(server: &MockServer) -> RecaptchaVerifier {
        RecaptchaVerifier::new("s3cret", format!("{}/recaptcha/api/siteverify", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .and(body_string_contains("secret=s3cret"))
            .and(body_string_contains("response=tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(verifier_for(&server).verify("tok-1").await);
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error-codes": ["invalid-input-response"]
            })))
            .mount(&server)
            .await;

        assert!(!verifier_for(&server).verify("bad").await);
    }

    #[tokio::test]
    async fn test_undecodable_response_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        assert!(!verifier_for(&server).verify("tok").await);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_closed() {
        let verifier = RecaptchaVerifier::new("s3cret", "http://127.0.0.1:9/siteverify").unwrap();
        assert!(!verifier.verify("tok").await);
    }
}
