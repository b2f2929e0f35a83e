//! Classification of error response bodies.
//!
//! The API is not consistent about error bodies. Parsing tries, in order:
//!
//! 1. a nested `error` object with `code`, `message` and `details`
//! 2. top-level `message` and `code` fields
//! 3. the raw body text
//! 4. the default message for the status code

use nexthink_core::ErrorKind;
use serde::Deserialize;
use tracing::error;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Builds an [`ApiError`] from a non-success response.
pub fn classify_error(status: u16, method: &str, endpoint: &str, body: &[u8]) -> ApiError {
    let status_text = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string();

    let mut api_error = ApiError {
        status,
        status_text,
        method: method.to_string(),
        endpoint: endpoint.to_string(),
        code: None,
        message: String::new(),
        details: None,
    };

    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        let (code, message, details) = match envelope.error {
            Some(nested) => (nested.code, nested.message, nested.details.map(details_text)),
            None => (envelope.code, envelope.message, None),
        };
        let code = code.filter(|c| !c.is_empty());
        let message = message.filter(|m| !m.is_empty());

        if code.is_some() || message.is_some() {
            api_error.code = code;
            api_error.message = message.unwrap_or_default();
            api_error.details = details;
            error!(
                status,
                method,
                endpoint,
                error_code = api_error.code.as_deref().unwrap_or(""),
                message = %api_error.message,
                "API error response"
            );
            return api_error;
        }
    }

    let raw = String::from_utf8_lossy(body).trim().to_string();
    api_error.message = if raw.is_empty() {
        ErrorKind::from_status(status).default_message().to_string()
    } else {
        raw
    };
    error!(status, method, endpoint, message = %api_error.message, "API error response");
    api_error
}

fn details_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
