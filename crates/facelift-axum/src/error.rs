//! HTTP error types and the mapping from core errors to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use facelift_core::CoreError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input, or enhancement before load).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream trouble (artifact host unreachable or failing).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotReady => {
                Self::BadRequest("Models are not yet loaded and ready.".to_string())
            }
            CoreError::Decode { .. } => Self::BadRequest(err.to_string()),
            CoreError::UnknownModel { .. } => Self::NotFound(err.to_string()),
            CoreError::Network { .. } => Self::ServiceUnavailable(err.to_string()),
            CoreError::Filesystem { .. } | CoreError::Processing { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_maps_to_bad_request() {
        let err: HttpError = CoreError::NotReady.into();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[test]
    fn unknown_model_maps_to_not_found() {
        let err: HttpError = CoreError::unknown_model("Nope").into();
        assert!(matches!(err, HttpError::NotFound(_)));
    }

    #[test]
    fn network_maps_to_service_unavailable() {
        let err: HttpError = CoreError::network_with_status("bad gateway", 502).into();
        assert!(matches!(err, HttpError::ServiceUnavailable(_)));
    }
}
