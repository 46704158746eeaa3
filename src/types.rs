//! Response envelope shared by the CLI commands
//!
//! Mirrors the relay's HTTP bodies: `{success, errorCode, result}` on
//! success and `{success, errorCode, message, details}` on failure.

use crate::error::{ErrorCode, SafeError};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Empty on success
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            error_code: String::new(),
            result: Some(result),
            message: None,
            details: None,
        }
    }

    pub fn err(error: SafeError) -> Self {
        Self {
            success: false,
            error_code: error_code_name(error.code),
            result: None,
            message: Some(error.message),
            details: error.details,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            r#"{"success":false,"errorCode":"internal","message":"Serialization failed"}"#.to_string()
        })
    }
}

fn error_code_name(code: ErrorCode) -> String {
    serde_json::to_value(code)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "internal".to_string())
}
