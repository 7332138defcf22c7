//! Error types for the AvaTax client.
//!
//! # Design
//! Transport and decode failures are captured as `Err` values so looping
//! callers can continue past one failed call; nothing in the dispatch path
//! panics. `Http` keeps the raw status, correlation id, and body alongside
//! the parsed error model so nothing the server said is lost. Fatal
//! programming errors (mutating a transaction line before one exists) are
//! panics in `builder`, not variants here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors returned by the client and dispatcher.
#[derive(Debug)]
pub enum ApiError {
    /// Required identity fields were missing at construction time.
    Configuration(String),

    /// The server answered with a non-success status. Captures everything
    /// needed to diagnose the call without re-issuing it.
    Http {
        status: u16,
        correlation_id: Option<String>,
        body: String,
        /// Machine-readable error model, when the body carried one.
        error: Option<ErrorInfo>,
    },

    /// The response claimed JSON but the body was not parseable JSON.
    UnexpectedFormat { message: String, body: String },

    /// Network-level failure, timeout, or (in raise mode) ureq's native
    /// status error.
    Transport(ureq::Error),

    /// The request payload could not be serialized to JSON.
    Serialization(String),
}

/// Envelope the remote API wraps error payloads in: `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: ErrorInfo,
}

/// Machine-readable error body returned on 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

/// One entry of the error `details` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_code: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ApiError::Http {
                status,
                correlation_id,
                error,
                ..
            } => {
                write!(f, "HTTP {status}")?;
                if let Some(info) = error {
                    write!(f, " {}: {}", info.code, info.message)?;
                }
                if let Some(id) = correlation_id {
                    write!(f, " (correlation id {id})")?;
                }
                Ok(())
            }
            ApiError::UnexpectedFormat { message, body } => {
                write!(f, "unexpected response format: {message}; body: {body}")
            }
            ApiError::Transport(err) => write!(f, "transport error: {err}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_result_parses_remote_body() {
        let body = r#"{
            "error": {
                "code": "AuthenticationException",
                "message": "Authentication failed.",
                "target": "HttpRequestHeaders",
                "details": [
                    {"code": "AuthenticationException", "number": 30, "faultCode": "Client"}
                ]
            }
        }"#;
        let parsed: ErrorResult = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, "AuthenticationException");
        assert_eq!(parsed.error.details.len(), 1);
        assert_eq!(parsed.error.details[0].number, Some(30));
        assert_eq!(parsed.error.details[0].fault_code.as_deref(), Some("Client"));
    }

    #[test]
    fn http_display_includes_code_and_correlation_id() {
        let err = ApiError::Http {
            status: 401,
            correlation_id: Some("abc-123".to_string()),
            body: "{}".to_string(),
            error: Some(ErrorInfo {
                code: "AuthenticationException".to_string(),
                message: "Authentication failed.".to_string(),
                target: None,
                details: Vec::new(),
            }),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("AuthenticationException"));
        assert!(text.contains("abc-123"));
    }

    #[test]
    fn unexpected_format_display_carries_raw_body() {
        let err = ApiError::UnexpectedFormat {
            message: "expected value at line 1".to_string(),
            body: "not-json".to_string(),
        };
        assert!(err.to_string().contains("not-json"));
    }
}
