//! Contact form submission endpoint

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use contact_common::{is_valid_email, SubmitSuccess, CAPTCHA_TOKEN_KEY};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::client_ip::client_identifier;
use crate::error::HandlerError;
use crate::notion::map_properties;
use crate::rate_limit::RateLimitResult;
use crate::sanitize::sanitize_fields;
use crate::{AppState, Result};

/// Accept a contact form submission and record it.
///
/// Steps run in a fixed order and stop at the first failure: method,
/// configuration, rate limit, payload, bot check, sanitize, email, store.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Response> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(HandlerError::MethodNotAllowed);
    }

    let Some(store) = state.store.as_ref() else {
        tracing::error!("Missing Notion configuration, rejecting submission");
        return Err(HandlerError::MissingConfiguration);
    };

    let client = client_identifier(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&client) {
        tracing::warn!(client = %client, "Rate limit exceeded");
        return Err(HandlerError::RateLimited { retry_after });
    }

    let fields = parse_form(&body)?;

    if let (Some(token), Some(verifier)) = (captcha_token(&fields), state.captcha.as_ref()) {
        if !verifier.verify(token).await {
            tracing::warn!(client = %client, "CAPTCHA verification failed");
            return Err(HandlerError::CaptchaFailed);
        }
    }

    let fields = sanitize_fields(fields);

    check_email(&fields)?;

    let properties = map_properties(&fields, Utc::now());
    let id = store.create_record(properties).await.map_err(|e| {
        tracing::error!(client = %client, error = %e, "Failed to create Notion page");
        HandlerError::from(e)
    })?;

    tracing::info!(client = %client, page_id = %id, "Contact form submitted successfully");
    Ok((StatusCode::OK, Json(SubmitSuccess::new(id))).into_response())
}

/// Parse the request body into form fields.
///
/// Anything that is not a non-empty JSON object counts as no data, except
/// malformed JSON which is reported as such.
pub fn parse_form(body: &[u8]) -> Result<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HandlerError::EmptyPayload);
    }

    match serde_json::from_slice::<Value>(body).map_err(HandlerError::InvalidJson)? {
        Value::Object(fields) if !fields.is_empty() => Ok(fields),
        _ => Err(HandlerError::EmptyPayload),
    }
}

/// A present `email` must be a well-formed address. Null and empty text
/// count as absent; any other non-string value is rejected.
pub fn check_email(fields: &Map<String, Value>) -> Result<()> {
    match fields.get("email") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(email)) if email.is_empty() || is_valid_email(email) => Ok(()),
        Some(_) => Err(HandlerError::InvalidEmail),
    }
}

fn captcha_token(fields: &Map<String, Value>) -> Option<&str> {
    fields
        .get(CAPTCHA_TOKEN_KEY)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_form_empty_body() {
        assert!(matches!(parse_form(b""), Err(HandlerError::EmptyPayload)));
        assert!(matches!(parse_form(b"  \n"), Err(HandlerError::EmptyPayload)));
    }

    #[test]
    fn test_parse_form_no_fields() {
        assert!(matches!(parse_form(b"{}"), Err(HandlerError::EmptyPayload)));
        assert!(matches!(parse_form(b"[1, 2]"), Err(HandlerError::EmptyPayload)));
        assert!(matches!(parse_form(b"null"), Err(HandlerError::EmptyPayload)));
    }

    #[test]
    fn test_parse_form_malformed() {
        assert!(matches!(parse_form(b"{\"name\":"), Err(HandlerError::InvalidJson(_))));
    }

    #[test]
    fn test_parse_form_keeps_order() {
        let fields = parse_form(br#"{"name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["name", "email"]);
    }

    #[test]
    fn test_check_email_rejects_non_text() {
        let fields = |v: Value| match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(check_email(&fields(json!({ "name": "Ada" }))).is_ok());
        assert!(check_email(&fields(json!({ "email": null }))).is_ok());
        assert!(check_email(&fields(json!({ "email": "" }))).is_ok());
        assert!(check_email(&fields(json!({ "email": "ada@example.com" }))).is_ok());
        assert!(matches!(check_email(&fields(json!({ "email": "ada@" }))), Err(HandlerError::InvalidEmail)));
        assert!(matches!(check_email(&fields(json!({ "email": 12345 }))), Err(HandlerError::InvalidEmail)));
        assert!(matches!(check_email(&fields(json!({ "email": true }))), Err(HandlerError::InvalidEmail)));
        assert!(matches!(check_email(&fields(json!({ "email": ["a@b.co"] }))), Err(HandlerError::InvalidEmail)));
    }

    #[test]
    fn test_captcha_token_requires_text() {
        let fields = |v: Value| match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(captcha_token(&fields(json!({ "captchaToken": "t" }))), Some("t"));
        assert_eq!(captcha_token(&fields(json!({ "captchaToken": "" }))), None);
        assert_eq!(captcha_token(&fields(json!({ "captchaToken": 7 }))), None);
        assert_eq!(captcha_token(&fields(json!({ "name": "Ada" }))), None);
    }
}
