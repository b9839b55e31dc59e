//! Submission payload sent from the widget to the handler

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// JSON key carrying the bot-verification token
pub const CAPTCHA_TOKEN_KEY: &str = "captchaToken";

/// Value collected for one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox state
    Flag(bool),
    /// Trimmed text input
    Text(String),
}

impl FieldValue {
    /// Empty text or an unchecked box
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Flag(checked) => !checked,
            Self::Text(text) => text.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Field values keyed by field name, in form declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "captchaToken", default, skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,
}

impl SubmissionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text value of a field, if it is a text field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_serializes_flat() {
        let mut payload = SubmissionPayload::new();
        payload.insert("name", "Ada");
        payload.insert("newsletter", true);
        payload.captcha_token = Some("tok".into());

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "captchaToken": "tok", "name": "Ada", "newsletter": true }));
    }

    #[test]
    fn test_payload_without_token_omits_key() {
        let mut payload = SubmissionPayload::new();
        payload.insert("email", "a@b.co");

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get(CAPTCHA_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::from(false).is_blank());
        assert!(!FieldValue::from("x").is_blank());
        assert!(!FieldValue::from(true).is_blank());
    }
}
