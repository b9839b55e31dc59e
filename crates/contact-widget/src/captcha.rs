//! Bot-verification handle
//!
//! The verification library is loaded asynchronously by the host page and
//! exposes a global object; the widget only polls it.

pub trait CaptchaHandle {
    /// Whether the verification library has finished loading
    fn is_loaded(&self) -> bool;

    /// Token of a completed challenge, if any
    fn response(&self) -> Option<String>;

    /// Clear the challenge so the next submission needs a fresh token
    fn reset(&mut self);
}

/// Handle for pages without bot verification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptcha;

impl CaptchaHandle for NoCaptcha {
    fn is_loaded(&self) -> bool {
        false
    }

    fn response(&self) -> Option<String> {
        None
    }

    fn reset(&mut self) {}
}
