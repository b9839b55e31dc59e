//! HTML rendering
//!
//! Markup only depends on the configuration; input values are never rendered,
//! so a re-render always yields a pristine form.

use crate::config::{FieldSpec, FieldType, WidgetConfig};

/// Verification library loaded next to the CAPTCHA slot
pub const CAPTCHA_SCRIPT_URL: &str = "https://www.google.com/recaptcha/api.js";

/// Character budget of the message field
pub const MESSAGE_CHAR_BUDGET: usize = 1000;

const DEFAULT_TEXTAREA_ROWS: u32 = 4;

/// Border hint for the message field as the user types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthHint {
    Normal,
    /// Fewer than 50 characters left
    Warning,
    /// Past the budget
    Over,
}

impl LengthHint {
    pub fn border_color(&self) -> &'static str {
        match self {
            Self::Normal => "#d1d5db",
            Self::Warning => "#f59e0b",
            Self::Over => "#ef4444",
        }
    }
}

pub fn message_length_hint(len: usize) -> LengthHint {
    match MESSAGE_CHAR_BUDGET as i64 - len as i64 {
        remaining if remaining < 0 => LengthHint::Over,
        remaining if remaining < 50 => LengthHint::Warning,
        _ => LengthHint::Normal,
    }
}

/// Render the whole widget: enabled fields, captcha slot, submit control,
/// loading indicator and status area.
pub fn render_widget(config: &WidgetConfig) -> String {
    let theme = &config.theme;
    let form = &config.form;

    let fields: String = config
        .enabled_fields()
        .map(|(key, spec)| render_field(key, spec))
        .collect();

    let captcha = if form.captcha_active() {
        format!(
            r#"<div class="captcha-container"><div class="g-recaptcha" data-sitekey="{}"></div></div><script src="{}" async defer></script>"#,
            escape(&form.captcha_site_key),
            CAPTCHA_SCRIPT_URL,
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            r#"<div class="contact-widget" style="font-family:{font};max-width:{width};border-radius:{radius}">"#,
            r#"<h2>{title}</h2>"#,
            r#"<form class="contact-form">{fields}{captcha}"#,
            r#"<button type="submit" class="submit-btn" style="background:{primary}">{submit}</button>"#,
            r#"<div class="loading" style="display:none"><div class="spinner"></div><p>{loading}</p></div>"#,
            r#"<div class="status-message" style="display:none"></div>"#,
            r#"</form></div>"#,
            "{style}"
        ),
        font = escape(&theme.font_family),
        width = escape(&theme.max_width),
        radius = escape(&theme.border_radius),
        title = escape(&form.title),
        fields = fields,
        captcha = captcha,
        primary = escape(&theme.primary_color),
        submit = escape(&form.submit_text),
        loading = escape(&form.loading_text),
        style = render_style(&theme.primary_color),
    )
}

/// Render one labeled control
pub fn render_field(key: &str, spec: &FieldSpec) -> String {
    let id = format!("contact-{}", escape(key));
    let name = escape(key);
    let label = escape(spec.display_label());
    let placeholder = escape(&spec.placeholder);
    let required = if spec.is_required() { " required" } else { "" };

    let control = match spec.field_type {
        FieldType::Textarea => format!(
            r#"<textarea id="{id}" name="{name}"{required} placeholder="{placeholder}" rows="{rows}"></textarea>"#,
            rows = spec.rows.unwrap_or(DEFAULT_TEXTAREA_ROWS),
        ),
        FieldType::Select => {
            let options: String = spec
                .options
                .iter()
                .map(|option| {
                    format!(
                        r#"<option value="{}"{}{}>{}</option>"#,
                        escape(&option.value),
                        if option.disabled { " disabled" } else { "" },
                        if option.selected { " selected" } else { "" },
                        escape(&option.text),
                    )
                })
                .collect();
            format!(r#"<select id="{id}" name="{name}"{required}>{options}</select>"#)
        }
        FieldType::Checkbox => {
            let checked = if spec.checked { " checked" } else { "" };
            return format!(
                r#"<div class="form-group"><div class="checkbox-group"><input type="checkbox" id="{id}" name="{name}"{checked}><label for="{id}">{label}</label></div></div>"#
            );
        }
        FieldType::Text | FieldType::Email | FieldType::Tel | FieldType::Url => format!(
            r#"<input type="{kind}" id="{id}" name="{name}"{required} placeholder="{placeholder}">"#,
            kind = spec.field_type.input_type(),
        ),
    };

    let marker = if spec.is_required() { " *" } else { "" };
    format!(r#"<div class="form-group"><label for="{id}">{label}{marker}</label>{control}</div>"#)
}

fn render_style(primary: &str) -> String {
    let primary = escape(primary);
    format!(
        concat!(
            "<style>",
            "@keyframes spin{{0%{{transform:rotate(0)}}100%{{transform:rotate(360deg)}}}}",
            ".contact-widget{{margin:0 auto;background:#fff;padding:24px;border:1px solid #e2e8f0}}",
            ".contact-widget h2{{font-size:24px;font-weight:600;margin:0 0 20px;text-align:center}}",
            ".contact-widget .form-group{{margin-bottom:16px}}",
            ".contact-widget .form-group label{{display:block;font-size:14px;font-weight:500;margin-bottom:6px}}",
            ".contact-widget .form-group input,.contact-widget .form-group textarea,.contact-widget .form-group select",
            "{{width:100%;padding:12px;border:1px solid #d1d5db;border-radius:8px;box-sizing:border-box}}",
            ".contact-widget .checkbox-group{{display:flex;align-items:center}}",
            ".contact-widget .checkbox-group input{{width:auto;margin-right:8px}}",
            ".contact-widget input:focus,.contact-widget textarea:focus,.contact-widget select:focus",
            "{{outline:none;border-color:{primary}}}",
            ".contact-widget .submit-btn{{width:100%;color:#fff;border:none;padding:12px 24px;border-radius:8px}}",
            ".contact-widget .submit-btn:disabled{{background:#9ca3af;cursor:not-allowed}}",
            ".contact-widget .spinner{{border:2px solid #f3f4f6;border-top:2px solid {primary};border-radius:50%;",
            "width:20px;height:20px;animation:spin 1s linear infinite;margin:0 auto}}",
            ".contact-widget .status-success{{background:#d1fae5;color:#065f46}}",
            ".contact-widget .status-error{{background:#fee2e2;color:#991b1b}}",
            "</style>"
        ),
        primary = primary,
    )
}

/// Escape text for element content and double-quoted attributes
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
