//! Error types for the storefront API client.

use serde::Deserialize;
use thiserror::Error;

use iwb_core::lenient;

/// Errors that can occur when calling the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Non-empty `error` field of the JSON body, if any.
        error: Option<String>,
        /// `error`, or a generic per-method status message.
        message: String,
    },

    /// The request was sent but no response arrived (connect failure, timeout).
    #[error("Network error: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// The request could not be built.
    #[error("Request could not be created: {0}")]
    Setup(String),

    /// The backend answered 2xx with a body of the wrong shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error from an already parsed error body.
    #[must_use]
    pub fn status(method: &reqwest::Method, status: u16, error: Option<String>) -> Self {
        let message = error
            .clone()
            .unwrap_or_else(|| format!("API {method} error: {status}"));
        Self::Status {
            status,
            error,
            message,
        }
    }

    /// Classify a transport error from reqwest.
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Setup(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::NoResponse(err)
        }
    }

    /// Whether the body of a 2xx response was malformed.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Optional `error` field of a JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract a non-empty `error` message from a raw body, tolerating
    /// non-JSON bodies.
    #[must_use]
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.is_empty())
    }
}
