//! Status message shown under the form

use std::time::{Duration, Instant};

/// Success messages disappear after this delay
pub const SUCCESS_AUTO_HIDE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    /// CSS class applied to the status area
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "status-success",
            Self::Error => "status-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
    /// `None` keeps the message until it is replaced
    pub auto_hide: Option<Duration>,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
            shown_at: Instant::now(),
            auto_hide: Some(SUCCESS_AUTO_HIDE),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
            shown_at: Instant::now(),
            auto_hide: None,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        match self.auto_hide {
            Some(delay) => now.saturating_duration_since(self.shown_at) < delay,
            None => true,
        }
    }
}
