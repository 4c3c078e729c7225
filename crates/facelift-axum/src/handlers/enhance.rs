//! Enhancement handler - the multipart batch endpoint.
//!
//! Each uploaded file runs through the pipeline independently: save the
//! original, decode, enhance on a blocking thread, write the result. A
//! file that fails at any step is logged and skipped so one bad upload
//! never aborts the batch; the response lists only the outputs that made
//! it through.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use std::path::Path;
use std::sync::Arc;

use facelift_core::{CoreError, CoreResult, ImageEnhancer, sanitize_filename};
use facelift_engine::DEFAULT_UPSCALE;

use crate::dto::EnhanceResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// Enhance a batch of uploaded images.
///
/// Rejects with 400 before touching any upload when the models are not
/// loaded. The `upscale_factor` form field applies to the whole batch and
/// defaults to 4.
pub async fn enhance(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnhanceResponse>, HttpError> {
    let engine = state.lifecycle.engine()?;

    let mut upscale = DEFAULT_UPSCALE;
    let mut uploads: Vec<(String, Bytes)> = Vec::new();

    // Field order is client-defined, so the whole form is read before any
    // file is processed; `upscale_factor` may arrive after the files.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(ToString::to_string);
        let file_name = field.file_name().map(ToString::to_string);

        if field_name.as_deref() == Some("upscale_factor") {
            let text = field
                .text()
                .await
                .map_err(|e| HttpError::BadRequest(format!("unreadable upscale_factor: {e}")))?;
            upscale = text
                .trim()
                .parse()
                .map_err(|_| HttpError::BadRequest(format!("invalid upscale_factor: {text}")))?;
            continue;
        }

        if let Some(original_name) = file_name {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| HttpError::BadRequest(format!("unreadable upload: {e}")))?;
            uploads.push((original_name, bytes));
        }
    }

    let mut images = Vec::new();
    for (original_name, bytes) in uploads {
        match process_upload(&state, &engine, &original_name, &bytes, upscale).await {
            Ok(output_filename) => images.push(output_filename),
            Err(err) => {
                tracing::error!(file = %original_name, error = %err, "skipping upload");
            }
        }
    }

    Ok(Json(EnhanceResponse {
        status: "success",
        images,
    }))
}

/// Run one upload through save-decode-enhance-write.
async fn process_upload(
    state: &AppState,
    engine: &Arc<dyn ImageEnhancer>,
    original_name: &str,
    bytes: &Bytes,
    upscale: u32,
) -> CoreResult<String> {
    let filename =
        sanitize_filename(original_name).ok_or_else(|| CoreError::decode(original_name))?;

    let input_path = state.paths.input_dir().join(&filename);
    tokio::fs::write(&input_path, bytes)
        .await
        .map_err(|e| CoreError::filesystem(&input_path, e))?;

    let decoded =
        image::load_from_memory(bytes).map_err(|_| CoreError::decode(filename.clone()))?;

    let stem = Path::new(&filename)
        .file_stem()
        .map_or_else(|| filename.clone(), |s| s.to_string_lossy().into_owned());
    let output_filename = format!("Enhanced_{stem}.png");
    let output_path = state.paths.output_dir().join(&output_filename);

    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || -> CoreResult<()> {
        let restored = engine.enhance(&decoded, upscale)?;
        restored
            .save(&output_path)
            .map_err(|e| CoreError::processing(format!("could not write output: {e}")))
    })
    .await
    .map_err(|e| CoreError::processing(format!("enhancement task failed: {e}")))??;

    tracing::info!(input = %filename, output = %output_filename, upscale, "image enhanced");
    Ok(output_filename)
}
