//! Contact Form Common Types
//!
//! Wire types and validation rules shared by the embeddable widget and the
//! submission handler.
//!
//! ```text
//! ┌──────────────┐   JSON POST   ┌──────────────────┐   pages API   ┌────────┐
//! │    Widget    │ ────────────▶ │ Submission       │ ────────────▶ │ Notion │
//! │  (renderer)  │ ◀──────────── │ Handler          │ ◀──────────── │        │
//! └──────────────┘  SubmitSuccess└──────────────────┘               └────────┘
//!                    / ErrorBody
//! ```

pub mod email;
pub mod models;
pub mod payload;

pub use email::is_valid_email;
pub use models::{ErrorBody, SubmitSuccess};
pub use payload::{FieldValue, SubmissionPayload, CAPTCHA_TOKEN_KEY};

/// Path the handler serves and the widget posts to, relative to the site URL
pub const SUBMIT_CONTACT_PATH: &str = "/.netlify/functions/submit-contact";
