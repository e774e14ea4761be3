//! Error types for Vercel API operations.
//!
//! Three kinds of failure reach callers: the transport failed before a
//! response arrived, a body could not be decoded, or the server answered
//! with a non-success status. The last case is carried by [`ApiError`],
//! which keeps the raw response bytes so callers can re-parse
//! endpoint-specific error payloads.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code given to the synthetic [`ApiError`] produced for a strict 204 response.
pub const NO_CONTENT_CODE: &str = "no_content";

/// Main error type for Vercel API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The server rejected the request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The request exceeded the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A request or response body could not be (de)serialised
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A URL could not be built
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An identifier was empty or malformed
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for Vercel API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured representation of a non-success response.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("API error {status_code} ({code}): {message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code reported by the API
    pub code: String,
    /// Human-readable message reported by the API
    pub message: String,
    /// HTTP status code of the response
    pub status_code: u16,
    /// Exact response body bytes
    #[serde(skip)]
    pub raw_message: Vec<u8>,
}

/// Wire envelope for API errors: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    /// Error details
    pub error: ErrorDetail,
}

/// Body of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    #[serde(default)]
    pub code: String,
    /// Human-readable error message
    #[serde(default)]
    pub message: String,
    /// Endpoint-specific fields sent alongside code and message
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ApiError {
    /// Build an `ApiError` from a response status and its body.
    ///
    /// When the body is not a valid error envelope the status and raw bytes
    /// are still kept; see [`ApiError::unstructured`].
    #[must_use]
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        Self::parse(status_code, body).unwrap_or_else(|_| Self::unstructured(status_code, body))
    }

    /// Strictly parse an error envelope.
    ///
    /// # Errors
    ///
    /// Returns the decode error if `body` is not `{"error": {...}}`.
    pub fn parse(status_code: u16, body: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body)?;
        Ok(Self {
            code: envelope.error.code,
            message: envelope.error.message,
            status_code,
            raw_message: body.to_vec(),
        })
    }

    /// An `ApiError` for a body that is not an error envelope.
    ///
    /// The code is empty and the message is the body text, or the status
    /// reason phrase when the body is empty.
    #[must_use]
    pub fn unstructured(status_code: u16, body: &[u8]) -> Self {
        Self {
            code: String::new(),
            message: fallback_message(status_code, body),
            status_code,
            raw_message: body.to_vec(),
        }
    }

    /// The error reported for a 204 response when the caller asked for
    /// strict no-content handling.
    #[must_use]
    pub fn no_content() -> Self {
        Self {
            code: NO_CONTENT_CODE.to_string(),
            message: "the server returned no content".to_string(),
            status_code: StatusCode::NO_CONTENT.as_u16(),
            raw_message: Vec::new(),
        }
    }

    /// Re-parse the raw response body into an endpoint-specific payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body does not match `T`.
    pub fn parse_raw<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.raw_message).map_err(Error::from)
    }

    /// Convert back into the wire envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.code.clone(),
                message: self.message.clone(),
                extra: serde_json::Map::new(),
            },
        }
    }

    /// Returns true for a 404 response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code == StatusCode::NOT_FOUND.as_u16()
    }
}

fn fallback_message(status_code: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("unknown error")
        .to_string()
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api(_) => "API_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidId(_) => "INVALID_ID",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// The structured API error, if the server answered.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of the response, if the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|err| err.status_code)
    }

    /// Returns true if the server answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }

    /// Returns true for a strict-mode 204 response.
    #[must_use]
    pub fn is_no_content(&self) -> bool {
        self.api_error().is_some_and(|err| {
            err.status_code == StatusCode::NO_CONTENT.as_u16() && err.code == NO_CONTENT_CODE
        })
    }
}

/// Returns true if `err` is an [`ApiError`] with status 404.
#[must_use]
pub fn not_found(err: &Error) -> bool {
    err.is_not_found()
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
