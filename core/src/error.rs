//! Error types for the registration client.
//!
//! # Design
//! Two layers. `ApiError` is what internal functions return and propagate
//! with `?`. `ErrorPayload` is the single failure shape handed to callers:
//! either the `{ "error": ... }` body the server sent, or one synthesized
//! from an `ApiError` description. Nothing else crosses the client boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building, executing, or decoding a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The descriptor's URL (after query expansion) is not an absolute URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A method token other than GET, POST, PUT, PATCH or DELETE.
    #[error("unknown http method: {0}")]
    UnknownMethod(String),

    /// Parameters did not serialize to a JSON object.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response (connectivity, timeout, TLS).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body matched neither the expected type nor an error payload.
    #[error("deserialization failed: {0}")]
    Decode(String),
}

/// Failure reported by the server or synthesized locally.
///
/// On the wire this is `{ "error": "<message>" }`. The key is required when
/// decoding, so an unrelated JSON object is not mistaken for a server error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "error")]
    pub message: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorPayload {}

impl From<ApiError> for ErrorPayload {
    fn from(err: ApiError) -> Self {
        ErrorPayload::new(err.to_string())
    }
}

/// Outcome of one call: the decoded value or the failure payload.
pub type ApiResult<T> = Result<T, ErrorPayload>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_payload_has_empty_message() {
        assert_eq!(ErrorPayload::default().message, "");
    }

    #[test]
    fn payload_uses_error_key_on_the_wire() {
        let json = serde_json::to_value(ErrorPayload::new("bad user")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "bad user" }));
    }

    #[test]
    fn payload_requires_error_key() {
        let result: Result<ErrorPayload, _> = serde_json::from_str(r#"{"message":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn api_error_converts_to_its_description() {
        let payload: ErrorPayload = ApiError::Transport("connection refused".to_string()).into();
        assert_eq!(payload.message, "transport failed: connection refused");
    }
}
