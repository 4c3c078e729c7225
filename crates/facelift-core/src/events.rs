//! Progress events - discriminated union for download and load progress.
//!
//! Events are produced continuously while a download or initialization is
//! running and consumed immediately by the transport layer; they are never
//! stored. The frontend switches on the `status` discriminant.

use serde::{Deserialize, Serialize};

/// A unit of streamed status describing download or initialization
/// advancement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Bytes are flowing for one model download.
    Downloading {
        /// Name of the model being downloaded.
        model_name: String,
        /// Bytes on disk so far, including any resumed prefix.
        downloaded: u64,
        /// Total bytes, when the remote reported a size.
        #[serde(skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
        /// Progress percentage; only present when the total is known.
        #[serde(skip_serializing_if = "Option::is_none")]
        percentage: Option<f64>,
        /// Human-readable transfer rate, e.g. `3.52 MB/s`.
        speed: String,
    },

    /// One model finished downloading.
    Completed {
        /// Name of the model that completed.
        model_name: String,
    },

    /// One model download failed terminally.
    Error {
        /// Name of the model that failed.
        model_name: String,
        /// What went wrong.
        error_message: String,
    },

    /// Initialization aborted because a model could not be fetched.
    ModelInitError {
        /// Name of the model that sank the initialization.
        model_name: String,
        /// What went wrong.
        error_message: String,
    },

    /// Device and precision summary, sent once the engine is (or already
    /// was) loaded.
    Info {
        /// Detected GPU name, or `CPU`.
        gpu_detected: String,
        /// Whether inference runs in half precision.
        half_precision: bool,
    },

    /// The engine is loaded and enhancement requests will be served.
    Ready,
}

impl ProgressEvent {
    /// Create a `downloading` event, deriving the percentage when the total
    /// size is known.
    #[allow(clippy::cast_precision_loss)]
    pub fn downloading(
        model_name: impl Into<String>,
        downloaded: u64,
        total: Option<u64>,
        speed: impl Into<String>,
    ) -> Self {
        let percentage = total
            .filter(|&t| t > 0)
            .map(|t| (downloaded as f64 / t as f64) * 100.0);
        Self::Downloading {
            model_name: model_name.into(),
            downloaded,
            total,
            percentage,
            speed: speed.into(),
        }
    }

    /// Create a `completed` event.
    pub fn completed(model_name: impl Into<String>) -> Self {
        Self::Completed {
            model_name: model_name.into(),
        }
    }

    /// Create an `error` event.
    pub fn error(model_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::Error {
            model_name: model_name.into(),
            error_message: error_message.into(),
        }
    }

    /// Create a `model_init_error` event.
    pub fn model_init_error(
        model_name: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self::ModelInitError {
            model_name: model_name.into(),
            error_message: error_message.into(),
        }
    }

    /// Whether this event ends its stream.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Error { .. } | Self::ModelInitError { .. } | Self::Ready
        )
    }
}
