//! Widget configuration
//!
//! The default configuration describes the full field catalogue; callers turn
//! fields on and off (or add their own) by passing a partial JSON override,
//! which is deep-merged onto the defaults. The result is fixed for the
//! lifetime of the widget instance.

use contact_common::SUBMIT_CONTACT_PATH;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::merge::merge;
use crate::Result;

/// Marker left in `api_url` when no site URL was baked in at build time
pub const SITE_URL_PLACEHOLDER: &str = "SITE_URL_NOT_DETECTED";

/// Site URL injected at compile time by the deployment build
const INJECTED_SITE_URL: Option<&str> = option_env!("CONTACT_SITE_URL");

/// Bot-verification public key injected at compile time
const INJECTED_CAPTCHA_SITE_KEY: Option<&str> = option_env!("RECAPTCHA_SITE_KEY");

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Submission endpoint
    pub api_url: String,
    pub theme: ThemeConfig,
    pub form: FormConfig,
    /// Field schema, rendered in declaration order
    pub fields: IndexMap<String, FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub primary_color: String,
    pub border_radius: String,
    pub font_family: String,
    pub max_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".into(),
            border_radius: "12px".into(),
            font_family: r#"-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif"#.into(),
            max_width: "500px".into(),
        }
    }
}

/// Form-level text and flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub title: String,
    pub submit_text: String,
    pub success_message: String,
    pub error_message: String,
    pub loading_text: String,
    pub enable_captcha: bool,
    pub captcha_site_key: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            title: "Contact Us".into(),
            submit_text: "Send Message".into(),
            success_message: "Thank you! Your message has been sent successfully.".into(),
            error_message: "Failed to send message. Please try again.".into(),
            loading_text: "Sending message...".into(),
            enable_captcha: true,
            captcha_site_key: INJECTED_CAPTCHA_SITE_KEY.unwrap_or_default().to_string(),
        }
    }
}

impl FormConfig {
    /// Bot verification only applies with both the flag and a site key
    pub fn captcha_active(&self) -> bool {
        self.enable_captcha && !self.captcha_site_key.trim().is_empty()
    }
}

/// Input control kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Tel,
    Url,
    Textarea,
    Select,
    Checkbox,
}

impl FieldType {
    /// `type` attribute for single-line inputs
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            _ => "text",
        }
    }
}

/// One entry of a select field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    pub disabled: bool,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str) -> Self {
        Self { value: value.into(), text: value.into(), ..Default::default() }
    }

    /// Disabled, preselected prompt entry
    fn prompt(text: &str) -> Self {
        Self { value: String::new(), text: text.into(), disabled: true, selected: true }
    }
}

fn select_options(prompt: &str, values: &[&str]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::prompt(prompt))
        .chain(values.iter().copied().map(SelectOption::new))
        .collect()
}

/// Field schema entry. Every member has a default so callers can add
/// ad-hoc fields with only the keys they care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldSpec {
    pub enabled: bool,
    /// Ignored for checkboxes
    pub required: bool,
    pub label: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Initial checkbox state
    pub checked: bool,
    /// Display text overriding `label`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
}

impl FieldSpec {
    fn input(label: &str, placeholder: &str, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            placeholder: placeholder.into(),
            field_type,
            ..Default::default()
        }
    }

    fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Text shown in the label and in missing-field messages
    pub fn display_label(&self) -> &str {
        self.custom_text.as_deref().unwrap_or(&self.label)
    }

    /// Checkboxes never participate in required checks
    pub fn is_required(&self) -> bool {
        self.required && self.field_type != FieldType::Checkbox
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let mut fields = IndexMap::new();
        fields.insert(
            "name".into(),
            FieldSpec::input("Full Name", "Your full name", FieldType::Text).enabled().required(),
        );
        fields.insert(
            "email".into(),
            FieldSpec::input("Email Address", "your@email.com", FieldType::Email).enabled().required(),
        );
        fields.insert(
            "phone".into(),
            FieldSpec::input("Phone Number", "+1 (555) 123-4567", FieldType::Tel),
        );
        fields.insert(
            "company".into(),
            FieldSpec::input("Company", "Your company name", FieldType::Text),
        );
        fields.insert(
            "subject".into(),
            FieldSpec {
                options: select_options(
                    "Select a subject",
                    &[
                        "General Inquiry",
                        "Support Request",
                        "Sales Question",
                        "Partnership",
                        "Feedback",
                        "Other",
                    ],
                ),
                ..FieldSpec::input("Subject", "Select a subject", FieldType::Select).required()
            },
        );
        fields.insert(
            "message".into(),
            FieldSpec {
                rows: Some(4),
                ..FieldSpec::input(
                    "Message",
                    "Please describe your inquiry or message...",
                    FieldType::Textarea,
                )
                .enabled()
                .required()
            },
        );
        fields.insert(
            "website".into(),
            FieldSpec::input("Website", "https://your-website.com", FieldType::Url),
        );
        fields.insert(
            "budget".into(),
            FieldSpec {
                options: select_options(
                    "Select budget range",
                    &[
                        "Under $1,000",
                        "$1,000 - $5,000",
                        "$5,000 - $10,000",
                        "$10,000 - $25,000",
                        "Over $25,000",
                    ],
                ),
                ..FieldSpec::input("Budget Range", "Select budget range", FieldType::Select)
            },
        );
        fields.insert(
            "newsletter".into(),
            FieldSpec::input("Subscribe to Newsletter", "", FieldType::Checkbox),
        );

        Self {
            api_url: resolve_api_url(INJECTED_SITE_URL),
            theme: ThemeConfig::default(),
            form: FormConfig::default(),
            fields,
        }
    }
}

impl WidgetConfig {
    /// Deep-merge a partial JSON configuration onto the defaults
    pub fn with_overrides(overrides: &Value) -> Result<Self> {
        Self::default().merged(overrides)
    }

    /// Deep-merge a partial JSON configuration onto this one
    pub fn merged(&self, overrides: &Value) -> Result<Self> {
        let base = serde_json::to_value(self)?;
        Ok(serde_json::from_value(merge(&base, overrides))?)
    }

    /// Enabled fields in declaration order
    pub fn enabled_fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields
            .iter()
            .filter(|(_, spec)| spec.enabled)
            .map(|(key, spec)| (key.as_str(), spec))
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|spec| spec.enabled)
    }

    /// Whether the endpoint still carries the build-time placeholder
    pub fn has_placeholder_url(&self) -> bool {
        self.api_url.contains(SITE_URL_PLACEHOLDER)
    }
}

/// Build the submission endpoint from the injected site URL.
///
/// Without a site URL the placeholder endpoint is returned; submissions to it
/// are refused rather than sent to a guessed address.
pub fn resolve_api_url(site_url: Option<&str>) -> String {
    match site_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => {
            tracing::debug!(site_url = url, "Using site URL from build injection");
            format!("{}{}", url.trim_end_matches('/'), SUBMIT_CONTACT_PATH)
        }
        None => {
            tracing::error!(
                "Could not detect site URL. Make sure the build process injected CONTACT_SITE_URL."
            );
            format!("{SITE_URL_PLACEHOLDER}{SUBMIT_CONTACT_PATH}")
        }
    }
}
