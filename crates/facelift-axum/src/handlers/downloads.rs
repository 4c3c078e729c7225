//! Download and model-loading handlers.
//!
//! The two SSE endpoints spawn the actual work onto a task that owns the
//! event sender; the request only holds the receiving end. A client that
//! disconnects mid-stream drops the receiver, and the download runs to
//! completion in the background because the lifecycle lock is held until
//! it finishes.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;

use facelift_core::{CoreError, ProgressEvent};

use crate::dto::{DownloadRequest, LoadResponse};
use crate::error::HttpError;
use crate::sse::{progress_channel, progress_stream};
use crate::state::AppState;

/// Stream the download of a single model as server-sent events.
///
/// The model is resolved by name against the catalog; a name the catalog
/// does not know produces an `error` event on the stream rather than an
/// HTTP error, since the response status is already committed once the
/// stream starts.
pub async fn download_model(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let (tx, rx) = progress_channel();

    tokio::spawn(async move {
        if let Err(err) = state.lifecycle.download_one(&req.name, &tx).await {
            // Fetch failures already carried a terminal `error` event; an
            // unknown model is the one path that reaches here silently.
            if matches!(err, CoreError::UnknownModel { .. }) {
                let _ = tx
                    .send(ProgressEvent::error(&req.name, err.to_string()))
                    .await;
            }
        }
    });

    progress_stream(rx)
}

/// Stream the full initialization sequence as server-sent events:
/// download every missing model, load the engine, then report the device
/// summary and `ready`.
pub async fn initialize_models(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let (tx, rx) = progress_channel();

    tokio::spawn(async move {
        // Failures already surface as error events on the stream.
        let _ = state.lifecycle.ensure_ready(&tx).await;
    });

    progress_stream(rx)
}

/// Synchronous variant of initialization: block until the engine is ready
/// (or the first failure) and answer with a plain JSON status.
pub async fn load_models(State(state): State<AppState>) -> Result<Json<LoadResponse>, HttpError> {
    let (tx, mut rx) = progress_channel();

    // Progress goes to the log instead of the response body.
    let drain = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            tracing::debug!(?event, "initialization progress");
        }
    });

    let result = state.lifecycle.ensure_ready(&tx).await;
    drop(tx);
    let _ = drain.await;

    result?;
    Ok(Json(LoadResponse {
        status: "success",
        message: "Models loaded into memory.".to_string(),
    }))
}
