//! Handler response bodies

use serde::{Deserialize, Serialize};

/// Body returned with `200` once the record was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSuccess {
    pub success: bool,
    pub message: String,
    pub id: String,
}

impl SubmitSuccess {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Contact form submitted successfully".into(),
            id: id.into(),
        }
    }
}

/// Body returned with every non-2xx status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { error: error.into(), details: Some(details.into()) }
    }
}
