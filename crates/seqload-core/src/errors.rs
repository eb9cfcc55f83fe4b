//! Error types.
//!
//! `FetchError` describes a single failed fetch. It is recorded in the
//! per-key error history and carried in `itemError` events, so it is
//! serializable and does not wrap foreign error types; transport errors are
//! captured as messages.
//!
//! `LoaderError` covers misuse of the loader handle itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for a single resource fetch.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// Network/HTTP error during the fetch.
    #[error("Network error: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// The resource does not exist on the remote side.
    #[error("Not found: {key}")]
    NotFound {
        /// The key that could not be found.
        key: String,
    },

    /// The key cannot be resolved to a fetchable location.
    #[error("Invalid resource key '{key}': {message}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why it could not be resolved.
        message: String,
    },

    /// The response body could not be read in the requested encoding.
    #[error("Decode error: {message}")]
    Decode {
        /// Detailed error message.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl FetchError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// HTTP status code, if the failure carried one.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Network { status_code, .. } => *status_code,
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Check if a later attempt could plausibly succeed.
    ///
    /// The loader never retries on its own; callers may re-enqueue the key.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Network {
                status_code: Some(code),
                ..
            } => *code >= 500 || *code == 408 || *code == 429,
            Self::Network { .. } => true,
            _ => false,
        }
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network {
                message,
                status_code: Some(code),
            } => format!("error loading file (HTTP {code}): {message}"),
            Self::Network { message, .. } => format!("error loading file: {message}"),
            Self::NotFound { key } => format!("error loading file: '{key}' was not found"),
            Self::InvalidKey { key, message } => {
                format!("error loading file: '{key}' is not a valid location ({message})")
            }
            Self::Decode { message } => format!("error loading file: unreadable body ({message})"),
            Self::Other { message } => format!("error loading file: {message}"),
        }
    }
}

/// Convenience result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised by the loader handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
    /// The background runner has exited and can no longer accept commands.
    #[error("Loader runner has stopped")]
    RunnerStopped,

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message.
        message: String,
    },
}

impl LoaderError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = FetchError::network_with_status("bad gateway", 502);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("502"));
        assert!(json.contains("\"kind\":\"network\""));

        let parsed: FetchError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(FetchError::network("connection reset").is_recoverable());
        assert!(FetchError::network_with_status("unavailable", 503).is_recoverable());
        assert!(FetchError::network_with_status("slow down", 429).is_recoverable());
        assert!(!FetchError::network_with_status("forbidden", 403).is_recoverable());
        assert!(!FetchError::not_found("a.bin").is_recoverable());
        assert!(!FetchError::invalid_key("::", "relative URL without a base").is_recoverable());
    }

    #[test]
    fn test_status_code() {
        assert_eq!(FetchError::not_found("a.bin").status_code(), Some(404));
        assert_eq!(
            FetchError::network_with_status("x", 500).status_code(),
            Some(500)
        );
        assert_eq!(FetchError::decode("bad utf-8").status_code(), None);
    }

    #[test]
    fn test_user_messages() {
        let err = FetchError::network_with_status("gateway timeout", 504);
        assert!(err.user_message().starts_with("error loading file"));
        assert!(err.user_message().contains("504"));

        let err = FetchError::not_found("b.bin");
        assert!(err.user_message().contains("b.bin"));
    }

    #[test]
    fn test_loader_error_display() {
        assert_eq!(
            LoaderError::RunnerStopped.to_string(),
            "Loader runner has stopped"
        );
        assert!(LoaderError::config("bad encoding").to_string().contains("bad encoding"));
    }
}
