//! Per-query fetch state

use serde::Serialize;

use crate::error::{ErrorKind, OmdbError};

/// State of one logical query (a search or a detail lookup)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchState<T> {
    /// Nothing requested yet, or the query is below the activation threshold
    Idle,
    /// A request for the active key is outstanding
    Loading,
    /// The active key's data
    Success { data: T },
    /// The active key's request failed
    Error { kind: ErrorKind, message: String },
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    /// Build the error state for `error`, using `fallback` for unexpected failures
    pub fn from_error(error: &OmdbError, fallback: &str) -> Self {
        Self::Error {
            kind: error.kind(),
            message: error.user_message(fallback),
        }
    }

    /// Whether a request is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The loaded data, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }
}
