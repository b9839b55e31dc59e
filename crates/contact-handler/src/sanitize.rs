//! Markup stripping for submitted text
//!
//! Best-effort removal of active markup before values reach the record
//! store. This is a regex filter, not an HTML parser.

use contact_common::CAPTCHA_TOKEN_KEY;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static ACTIVE_ELEMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script\s*>|<iframe\b.*?</iframe\s*>|<object\b.*?</object\s*>|<embed\b.*?</embed\s*>",
    )
    .expect("element pattern is valid")
});

static JAVASCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("scheme pattern is valid"));

static INLINE_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+\s*=").expect("handler pattern is valid"));

/// Strip script-like content from `input`.
///
/// Passes repeat until nothing changes, so fragments that reassemble into a
/// new match after one removal are caught too.
pub fn sanitize_input(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return next.trim().to_string();
        }
        current = next;
    }
}

fn strip_once(input: &str) -> String {
    let out = ACTIVE_ELEMENTS.replace_all(input, "");
    let out = JAVASCRIPT_SCHEME.replace_all(&out, "");
    INLINE_HANDLER.replace_all(&out, "").into_owned()
}

/// Sanitize every string field and drop the bot-verification token.
/// Non-string values pass through unchanged.
pub fn sanitize_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter(|(key, _)| key != CAPTCHA_TOKEN_KEY)
        .map(|(key, value)| match value {
            Value::String(text) => (key, Value::String(sanitize_input(&text))),
            other => (key, other),
        })
        .collect()
}
