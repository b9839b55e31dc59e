//! Notion record store
//!
//! Maps sanitized submissions onto Notion database properties and creates
//! one page per submission.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::NotionCredentials;

/// Notion API base URL
pub const NOTION_API_URL: &str = "https://api.notion.com";

/// Pinned Notion API version
pub const NOTION_VERSION: &str = "2022-06-28";

/// Record store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Non-success answer from the store, status and message preserved
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record created without an id")]
    MissingId,
}

/// Destination for accepted submissions
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create one record and return its id
    async fn create_record(&self, properties: Map<String, Value>) -> Result<String, StoreError>;
}

/// Notion pages API client
pub struct NotionClient {
    client: reqwest::Client,
    credentials: NotionCredentials,
    base_url: String,
}

impl NotionClient {
    pub fn new(credentials: NotionCredentials, base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn pages_url(&self) -> String {
        format!("{}/v1/pages", self.base_url)
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_record(&self, properties: Map<String, Value>) -> Result<String, StoreError> {
        tracing::info!(
            database_id = %self.credentials.database_id,
            properties = ?properties.keys().collect::<Vec<_>>(),
            "Submitting to Notion"
        );

        let body = json!({
            "parent": { "database_id": self.credentials.database_id },
            "properties": properties,
        });

        let response = self
            .client
            .post(self.pages_url())
            .bearer_auth(&self.credentials.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = api_error_message(status.as_u16(), &text);
            tracing::error!(status = status.as_u16(), error = %message, "Notion API error");
            return Err(StoreError::Api { status: status.as_u16(), message });
        }

        let page: Value = response.json().await?;
        page.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(StoreError::MissingId)
    }
}

/// Pick the message from a failed Notion response body: `error`, then
/// `message`, then the raw text.
fn api_error_message(status: u16, text: &str) -> String {
    let parsed = serde_json::from_str::<Value>(text).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|body| body.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("error")
        .or_else(|| field("message"))
        .or_else(|| {
            let raw = text.trim();
            (parsed.is_none() && !raw.is_empty()).then(|| raw.to_string())
        })
        .unwrap_or_else(|| format!("Notion API error: {status}"))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn rich_text(content: String) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build Notion page properties from sanitized fields.
///
/// `Status` and `Date Received` are always present. Null and empty-string
/// values are left out.
pub fn map_properties(fields: &Map<String, Value>, received_at: DateTime<Utc>) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("Status".into(), json!({ "select": { "name": "New" } }));
    properties.insert(
        "Date Received".into(),
        json!({ "date": { "start": received_at.to_rfc3339_opts(SecondsFormat::Millis, true) } }),
    );

    for (key, value) in fields {
        if value.is_null() || value.as_str() == Some("") {
            continue;
        }

        let (name, property) = match key.as_str() {
            "name" => ("Name".to_string(), json!({ "title": [{ "text": { "content": text_of(value) } }] })),
            "email" => ("Email".to_string(), json!({ "email": text_of(value) })),
            "phone" => ("Phone".to_string(), json!({ "phone_number": text_of(value) })),
            "website" => ("Website".to_string(), json!({ "url": text_of(value) })),
            "newsletter" => {
                let answer = if truthy(value) { "Yes" } else { "No" };
                ("Newsletter".to_string(), json!({ "select": { "name": answer } }))
            }
            // company, subject, message, budget and any extra field
            other => (capitalize(other), rich_text(text_of(value))),
        };
        properties.insert(name, property);
    }

    properties
}
