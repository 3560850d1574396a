//! Error taxonomy for the FitFusion API client.
//!
//! Three classes, matching what callers need to distinguish:
//! - `NoResponse`: the request went out but no usable response came back
//!   (connection refused, timeout, broken stream).
//! - `Server`: the server answered with a non-2xx status. The message is the
//!   server-provided one when the body carries it, else an
//!   operation-specific fallback.
//! - `Setup`: the request could not be constructed or sent at all.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response received from server")]
    NoResponse {
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("error setting up the request")]
    Setup {
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Build a `Server` error from a non-2xx response, consuming its body to
    /// extract the server-provided message. `fallback` is used when the body
    /// carries no recognizable message field.
    pub(crate) async fn from_response(response: reqwest::Response, fallback: &str) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
        ApiError::Server { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_builder() {
            ApiError::Setup { source }
        } else {
            ApiError::NoResponse { source }
        }
    }
}

/// Extract the server's error message from a JSON body. DRF endpoints in
/// this API use `detail` (auth), `message` (content/search) or `error`
/// (vector-store views) depending on the view.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "message", "error"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

/// Flatten a field-keyed validation error body (as returned by the
/// registration endpoint) into a human-readable multi-line string:
///
/// ```text
/// username: A user with that username already exists.
/// password: This field may not be blank.
/// ```
///
/// Returns `None` when the body is not an object or carries nothing usable.
pub fn flatten_field_errors(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    let mut lines = Vec::new();
    for (field, errors) in map {
        let rendered = match errors {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        };
        if rendered.is_empty() {
            continue;
        }
        if field == "detail" || field == "non_field_errors" {
            lines.push(rendered);
        } else {
            lines.push(format!("{}: {}", field, rendered));
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Check a response status and convert non-2xx into a classified `Server`
/// error with the given fallback message.
pub(crate) async fn expect_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response, fallback).await)
    }
}
