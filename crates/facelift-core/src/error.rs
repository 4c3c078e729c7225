//! Error taxonomy shared across the workspace.
//!
//! Variants are serializable and carry strings rather than source error
//! types, so they can cross the SSE wire and be asserted on in tests.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for catalog, download, lifecycle and enhancement operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoreError {
    /// A directory or file was unreadable or unwritable. Fatal to the
    /// current operation; never retried.
    #[error("filesystem error at {path}: {message}")]
    Filesystem {
        /// Path the operation touched.
        path: String,
        /// Detailed error message.
        message: String,
    },

    /// Network/HTTP failure during a download. Transient; retried with
    /// backoff until the attempt budget is exhausted.
    #[error("network error: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// An uploaded image could not be decoded. The file is skipped and the
    /// rest of the batch continues.
    #[error("could not decode image: {name}")]
    Decode {
        /// Name of the offending upload.
        name: String,
    },

    /// Enhancement was requested before the models were loaded.
    #[error("models are not loaded")]
    NotReady,

    /// The restoration pipeline failed on an input that did decode.
    /// Surfaced to the caller; the engine stays loaded.
    #[error("enhancement failed: {message}")]
    Processing {
        /// Detailed error message.
        message: String,
    },

    /// A download was requested for a model the catalog does not know.
    #[error("unknown model: {name}")]
    UnknownModel {
        /// The requested model name.
        name: String,
    },
}

impl CoreError {
    /// Create a filesystem error from a path and an underlying error.
    pub fn filesystem(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Filesystem {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create a network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error carrying an HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a decode error for one upload.
    pub fn decode(name: impl Into<String>) -> Self {
        Self::Decode { name: name.into() }
    }

    /// Create a processing error.
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }

    /// Create an unknown-model error.
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    /// Whether a retry with backoff may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_retryable() {
        assert!(CoreError::network("connection reset").is_retryable());
        assert!(CoreError::network_with_status("service unavailable", 503).is_retryable());
        assert!(!CoreError::NotReady.is_retryable());
        assert!(!CoreError::decode("x.png").is_retryable());
    }

    #[test]
    fn serializes_with_status_code() {
        let err = CoreError::network_with_status("bad gateway", 502);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("502"));

        let parsed: CoreError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn filesystem_error_keeps_path() {
        let err = CoreError::filesystem(Path::new("/tmp/weights"), "permission denied");
        assert!(err.to_string().contains("/tmp/weights"));
        assert!(err.to_string().contains("permission denied"));
    }
}
