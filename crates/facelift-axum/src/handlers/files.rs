//! Output file management - serving, deletion and zip packaging.

use axum::Json;
use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use facelift_core::{CoreError, CoreResult, sanitize_filename};

use crate::dto::SimpleStatus;
use crate::error::HttpError;
use crate::state::AppState;

/// Name of the archive `download_all` assembles in the output directory.
const ZIP_FILENAME: &str = "Enhanced-Images.zip";

/// Serve one enhanced image from the output directory.
pub async fn get_output(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, HttpError> {
    let path = resolve_output(&state, &filename)?;

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(HttpError::NotFound(format!("no such output: {filename}")))
        }
        Err(e) => Err(CoreError::filesystem(&path, e).into()),
    }
}

/// Delete one enhanced image from the output directory.
pub async fn remove_output(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Json<SimpleStatus>, HttpError> {
    let path = resolve_output(&state, &filename)?;

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(file = %filename, "output removed");
            Ok(Json(SimpleStatus::success()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(HttpError::NotFound(format!("no such output: {filename}")))
        }
        Err(e) => Err(CoreError::filesystem(&path, e).into()),
    }
}

/// Delete every uploaded original and enhanced output.
pub async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<SimpleStatus>, HttpError> {
    for dir in [state.paths.input_dir(), state.paths.output_dir()] {
        clear_directory(&dir).await?;
    }
    tracing::info!("history cleared");
    Ok(Json(SimpleStatus::success()))
}

/// Package every enhanced PNG into one zip archive and serve it.
pub async fn download_all(State(state): State<AppState>) -> Result<Response, HttpError> {
    let output_dir = state.paths.output_dir();
    let zip_path = output_dir.join(ZIP_FILENAME);

    let archive = {
        let zip_path = zip_path.clone();
        tokio::task::spawn_blocking(move || build_archive(&output_dir, &zip_path))
            .await
            .map_err(|e| CoreError::processing(format!("zip task failed: {e}")))??
    };

    let bytes = tokio::fs::read(&zip_path)
        .await
        .map_err(|e| CoreError::filesystem(&zip_path, e))?;

    tracing::info!(files = archive, bytes = bytes.len(), "serving zip archive");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ZIP_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Validate a client-supplied filename and anchor it in the output dir.
fn resolve_output(state: &AppState, filename: &str) -> Result<PathBuf, HttpError> {
    let safe = sanitize_filename(filename)
        .ok_or_else(|| HttpError::BadRequest(format!("invalid filename: {filename}")))?;
    Ok(state.paths.output_dir().join(safe))
}

/// Remove every regular file directly inside `dir`.
async fn clear_directory(dir: &Path) -> CoreResult<()> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| CoreError::filesystem(dir, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::filesystem(dir, e))?
    {
        let path = entry.path();
        if path.is_file() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| CoreError::filesystem(&path, e))?;
        }
    }
    Ok(())
}

/// Write all output PNGs into a deflate-compressed archive at `zip_path`.
/// Returns how many files were packaged.
fn build_archive(output_dir: &Path, zip_path: &Path) -> CoreResult<usize> {
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    let file =
        std::fs::File::create(zip_path).map_err(|e| CoreError::filesystem(zip_path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    let entries =
        std::fs::read_dir(output_dir).map_err(|e| CoreError::filesystem(output_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::filesystem(output_dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // The archive itself lives in the same directory; skip it along
        // with anything that is not an enhanced PNG.
        if !name.to_lowercase().ends_with(".png") {
            continue;
        }

        writer
            .start_file(name, options)
            .map_err(|e| CoreError::processing(format!("zip entry {name}: {e}")))?;
        let mut source =
            std::fs::File::open(&path).map_err(|e| CoreError::filesystem(&path, e))?;
        std::io::copy(&mut source, &mut writer)
            .map_err(|e| CoreError::processing(format!("zip entry {name}: {e}")))?;
        count += 1;
    }

    writer
        .finish()
        .map_err(|e| CoreError::processing(format!("finalizing zip: {e}")))?;
    Ok(count)
}

/// Content type for a served output, from its extension.
fn content_type(path: &Path) -> String {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
