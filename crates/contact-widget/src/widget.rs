//! Widget instance and submission flow

use contact_common::{is_valid_email, FieldValue, SubmissionPayload};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::captcha::CaptchaHandle;
use crate::config::{FieldType, WidgetConfig};
use crate::render::render_widget;
use crate::status::StatusMessage;
use crate::transport::SubmitTransport;
use crate::Result;

/// Submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Success,
    Error,
}

/// Reasons a submission is stopped before any request is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("CAPTCHA is loading. Please wait and try again.")]
    CaptchaLoading,

    #[error("Please complete the CAPTCHA verification.")]
    CaptchaIncomplete,

    #[error("This contact form is not configured: the site URL was not injected at build time.")]
    SiteUrlMissing,
}

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stopped by local validation
    Rejected(Rejection),
    /// Accepted by the handler
    Submitted { id: Option<String> },
    /// Handler or transport failure, with the message shown to the user
    Failed { message: String },
}

/// One mounted contact form
pub struct ContactWidget<T, C> {
    config: WidgetConfig,
    transport: T,
    captcha: C,
    /// Raw control values; a checked checkbox holds "on", an unchecked one is absent
    inputs: IndexMap<String, String>,
    state: SubmissionState,
    status: Option<StatusMessage>,
    submit_enabled: bool,
    loading: bool,
}

impl<T: SubmitTransport, C: CaptchaHandle> ContactWidget<T, C> {
    /// Mount a widget with a partial configuration merged onto the defaults
    pub fn new(overrides: &Value, transport: T, captcha: C) -> Result<Self> {
        Ok(Self::with_config(WidgetConfig::with_overrides(overrides)?, transport, captcha))
    }

    pub fn with_config(config: WidgetConfig, transport: T, captcha: C) -> Self {
        let mut widget = Self {
            config,
            transport,
            captcha,
            inputs: IndexMap::new(),
            state: SubmissionState::Idle,
            status: None,
            submit_enabled: true,
            loading: false,
        };
        widget.reset_inputs();
        widget
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn captcha(&self) -> &C {
        &self.captcha
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn render(&self) -> String {
        render_widget(&self.config)
    }

    /// Current raw value of a control
    pub fn value(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).map(String::as_str)
    }

    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        self.inputs.insert(key.to_string(), value.into());
    }

    pub fn set_checked(&mut self, key: &str, checked: bool) {
        if checked {
            self.inputs.insert(key.to_string(), "on".into());
        } else {
            self.inputs.shift_remove(key);
        }
    }

    /// Validate, then post the form. The submit control is re-enabled and the
    /// loading indicator hidden on every path out of this call.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.transition(SubmissionState::Validating);

        let payload = match self.prepare() {
            Ok(payload) => payload,
            Err(rejection) => {
                debug!(%rejection, "Submission rejected locally");
                self.status = Some(StatusMessage::error(rejection.to_string()));
                self.transition(SubmissionState::Idle);
                return SubmitOutcome::Rejected(rejection);
            }
        };

        self.set_loading(true);
        self.status = None;
        self.transition(SubmissionState::Submitting);

        debug!(api_url = %self.config.api_url, "Submitting contact form");
        let outcome = match self.transport.post_json(&self.config.api_url, &payload).await {
            Ok(response) if response.is_success() => {
                info!("Contact form submitted");
                self.status = Some(StatusMessage::success(self.config.form.success_message.clone()));
                self.reset_inputs();
                self.reset_captcha();
                self.transition(SubmissionState::Success);
                SubmitOutcome::Submitted {
                    id: response.body.get("id").and_then(Value::as_str).map(str::to_string),
                }
            }
            Ok(response) => {
                let message = response
                    .error_message()
                    .unwrap_or(self.config.form.error_message.as_str())
                    .to_string();
                warn!(status = response.status, %message, "Contact form rejected by server");
                self.fail(message)
            }
            Err(err) => {
                error!(error = %err, api_url = %self.config.api_url, "Contact form submission error");
                self.fail(err.user_message().to_string())
            }
        };

        self.set_loading(false);
        self.transition(SubmissionState::Idle);
        outcome
    }

    fn fail(&mut self, message: String) -> SubmitOutcome {
        self.status = Some(StatusMessage::error(message.clone()));
        self.reset_captcha();
        self.transition(SubmissionState::Error);
        SubmitOutcome::Failed { message }
    }

    /// Local checks in order: required fields, email shape, bot verification,
    /// endpoint configuration.
    fn prepare(&self) -> std::result::Result<SubmissionPayload, Rejection> {
        let mut payload = collect_values(&self.config, &self.inputs);

        let missing = missing_required(&self.config, &payload);
        if !missing.is_empty() {
            return Err(Rejection::MissingFields(missing));
        }

        if self.config.is_enabled("email") {
            if let Some(email) = payload.text("email").filter(|email| !email.is_empty()) {
                if !is_valid_email(email) {
                    return Err(Rejection::InvalidEmail);
                }
            }
        }

        if self.config.form.captcha_active() {
            if !self.captcha.is_loaded() {
                return Err(Rejection::CaptchaLoading);
            }
            let token = self
                .captcha
                .response()
                .filter(|token| !token.is_empty())
                .ok_or(Rejection::CaptchaIncomplete)?;
            payload.captcha_token = Some(token);
        }

        if self.config.has_placeholder_url() {
            error!(
                api_url = %self.config.api_url,
                "Refusing to submit: site URL was not injected at build time"
            );
            return Err(Rejection::SiteUrlMissing);
        }

        Ok(payload)
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.submit_enabled = !loading;
    }

    fn reset_captcha(&mut self) {
        if self.config.form.captcha_active() && self.captcha.is_loaded() {
            self.captcha.reset();
        }
    }

    /// Back to the rendered defaults: empty text, checkboxes at `checked`
    fn reset_inputs(&mut self) {
        self.inputs.clear();
        for (key, spec) in &self.config.fields {
            if spec.field_type == FieldType::Checkbox && spec.checked {
                self.inputs.insert(key.clone(), "on".into());
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = ?self.state, to = ?next, "Widget state change");
        self.state = next;
    }
}

/// Gather values of enabled fields: checkboxes as presence flags, everything
/// else as trimmed text (empty when absent).
pub fn collect_values(config: &WidgetConfig, inputs: &IndexMap<String, String>) -> SubmissionPayload {
    let mut payload = SubmissionPayload::new();
    for (key, spec) in config.enabled_fields() {
        let value = match spec.field_type {
            FieldType::Checkbox => FieldValue::Flag(inputs.contains_key(key)),
            _ => FieldValue::Text(inputs.get(key).map(|v| v.trim().to_string()).unwrap_or_default()),
        };
        payload.insert(key, value);
    }
    payload
}

/// Display labels of every enabled, required field left blank
pub fn missing_required(config: &WidgetConfig, payload: &SubmissionPayload) -> Vec<String> {
    config
        .enabled_fields()
        .filter(|(_, spec)| spec.is_required())
        .filter(|(key, _)| payload.get(key).map_or(true, FieldValue::is_blank))
        .map(|(_, spec)| spec.display_label().to_string())
        .collect()
}
