//! Status handler - missing models and device info.

use axum::Json;
use axum::extract::State;

use crate::dto::{MissingModel, StatusResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Report which catalog models are absent from disk plus the device and
/// precision summary. Read-only; fails only when the weight directories
/// are unreadable.
pub async fn get(State(state): State<AppState>) -> Result<Json<StatusResponse>, HttpError> {
    let missing = state.lifecycle.catalog().missing()?;

    Ok(Json(StatusResponse {
        missing_models: missing.into_iter().map(MissingModel::from).collect(),
        system_info: state.lifecycle.system_info(),
    }))
}
