//! Error types for the OMDb client and the fetch controllers
//!
//! Provides the error enum shared by every fetch path, a coarse
//! [`ErrorKind`] used by fetch state, and IPC-friendly serialization.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Message shown for any failure that is not a domain error
pub const UNEXPECTED_SEARCH_ERROR: &str = "An unexpected error occurred while loading movies";

/// Message shown for non-domain failures on the detail page
pub const UNEXPECTED_DETAIL_ERROR: &str =
    "An unexpected error occurred while loading movie details";

/// Error type for all OMDb operations
#[derive(Error, Debug)]
pub enum OmdbError {
    /// Input rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Service reached but reported a logical failure
    ///
    /// The message is the service's `Error` field, verbatim.
    #[error("{0}")]
    Domain(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Service answered with a non-2xx status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

/// Coarse error classification carried by fetch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed input
    Validation,
    /// Logical failure reported by the service
    Domain,
    /// Network, status or decoding failure
    Transport,
}

impl OmdbError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Domain(_) => ErrorKind::Domain,
            Self::HttpError(_) | Self::Status(_) | Self::Decode(_) | Self::Cancelled => {
                ErrorKind::Transport
            }
        }
    }

    /// Whether a detail lookup may try again after this error
    ///
    /// Timeouts, connection failures and 5xx answers are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::Status(code) => (500..600).contains(code),
            _ => false,
        }
    }

    /// Message to show the user, given the fallback for unexpected failures
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Domain(message) => message.clone(),
            Self::Validation(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl Serialize for OmdbError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for OMDb operations
pub type Result<T> = std::result::Result<T, OmdbError>;
