//! Contact Form Widget
//!
//! Client side of the contact form pipeline.
//!
//! ## Components
//!
//! - **Config**: default form schema, deep-merged with caller overrides
//! - **Render**: HTML for the enabled fields, in declaration order
//! - **Widget**: `Idle → Validating → Submitting → {Success, Error} → Idle`
//! - **Transport**: JSON POST to the submission handler
//!
//! The widget never talks to a DOM directly. Input values are fed in through
//! [`ContactWidget::set_value`] and [`ContactWidget::set_checked`], and the
//! bot-verification library is reached through [`CaptchaHandle`].

pub mod captcha;
pub mod config;
pub mod merge;
pub mod render;
pub mod status;
pub mod transport;
pub mod widget;

pub use captcha::{CaptchaHandle, NoCaptcha};
pub use config::{FieldSpec, FieldType, FormConfig, SelectOption, ThemeConfig, WidgetConfig};
pub use merge::merge;
pub use render::{render_field, render_widget};
pub use status::{StatusKind, StatusMessage};
pub use transport::{HttpTransport, SubmitTransport, TransportError, TransportResponse};
pub use widget::{ContactWidget, Rejection, SubmissionState, SubmitOutcome};

use thiserror::Error;

/// Widget errors
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("invalid widget configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
