//! Route definitions and router construction.
//!
//! Model-management endpoints live under `/api`; the enhancement and
//! file-management endpoints keep their original top-level paths, which is
//! what the shipped frontend calls.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Upload ceiling for the enhancement endpoint; large photos at full
/// resolution clear the default 2 MB body limit easily.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Model-lifecycle routes, nested under `/api` by the caller.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::status::get))
        .route("/download_model", post(handlers::downloads::download_model))
        .route(
            "/initialize_models",
            get(handlers::downloads::initialize_models),
        )
        .route("/load_models", post(handlers::downloads::load_models))
}

/// Create the main router with all API routes.
///
/// For serving the frontend as well, use [`create_spa_router`], which adds
/// static file serving with an SPA fallback.
pub fn create_router(ctx: AppContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .route(
            "/enhance",
            post(handlers::enhance::enhance).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/output/{filename}",
            get(handlers::files::get_output).delete(handlers::files::remove_output),
        )
        .route("/clear_history", post(handlers::files::clear_history))
        .route("/download_all", post(handlers::files::download_all))
        .layer(cors)
        .with_state(state)
}

/// Create a router that also serves the frontend build.
///
/// API routes take priority; anything unmatched falls back to static
/// assets, with `index.html` covering client-side routes.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AppContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
