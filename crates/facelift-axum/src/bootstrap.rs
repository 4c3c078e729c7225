//! Server bootstrap - the composition root.
//!
//! This module is the only place concrete adapters are wired to the core
//! ports: the HTTP fetcher, the engine builder and the hardware probe all
//! meet the lifecycle manager here.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use facelift_core::{AppPaths, LifecycleManager, ModelCatalog};
use facelift_download::HttpFetcher;
use facelift_engine::{DefaultSystemProbe, EngineBuilder};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the web adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Data root holding inputs, outputs and the weight directories.
    pub data_dir: PathBuf,
    /// Optional path to the frontend build for SPA serving.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Configuration matching the shipped deployment: localhost:3020 with
    /// the data layout rooted in the working directory.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3020,
            data_dir: PathBuf::from("."),
            static_dir: None,
            cors: CorsConfig::default(),
        }
    }

    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context shared by all handlers.
pub struct AppContext {
    /// Resolved data-directory layout.
    pub paths: AppPaths,
    /// The lifecycle manager guarding downloads and the engine handle.
    pub lifecycle: Arc<LifecycleManager>,
}

/// Wire the production adapters into a ready-to-serve context.
///
/// Prepares the on-disk layout, probes the inference device once and
/// assembles the lifecycle manager over the built-in catalog.
pub fn bootstrap(config: &ServerConfig) -> Result<AppContext> {
    let paths = AppPaths::new(&config.data_dir);
    paths
        .prepare()
        .with_context(|| format!("preparing data directory {}", config.data_dir.display()))?;

    let catalog = ModelCatalog::builtin(&paths);
    tracing::info!(
        data_root = %paths.data_root().display(),
        models = catalog.specs().len(),
        "bootstrap resolved paths"
    );

    let lifecycle = Arc::new(LifecycleManager::new(
        catalog,
        Arc::new(HttpFetcher::new()),
        Arc::new(EngineBuilder),
        &DefaultSystemProbe,
    ));

    Ok(AppContext { paths, lifecycle })
}

/// Start the web server with the given configuration.
///
/// If `config.static_dir` is set, serves the frontend with an SPA
/// fallback; otherwise only the API endpoints are exposed.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config)?;

    let app = if let Some(ref static_dir) = config.static_dir {
        tracing::info!(dir = %static_dir.display(), "serving frontend assets");
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("facelift server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
