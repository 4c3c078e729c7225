//! Model lifecycle orchestration.
//!
//! The [`LifecycleManager`] owns the only piece of process-wide mutable
//! state: the engine handle. It guarantees at-most-once construction under
//! concurrent callers by holding one mutex across the entire
//! check-download-load sequence; callers that arrive mid-initialization
//! block on the lock and then observe the already-published engine.
//!
//! A failed initialization leaves no trace besides partial weight files,
//! so a later `ensure_ready` call starts over cleanly.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

use crate::catalog::ModelCatalog;
use crate::error::{CoreError, CoreResult};
use crate::events::ProgressEvent;
use crate::ports::{ArtifactFetcher, EngineLoader, EventSender, ImageEnhancer, SystemProbe};

/// Device and readiness summary reported by the status endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Detected GPU name, or `CPU`.
    pub gpu_detected: String,
    /// Whether inference runs in half precision.
    pub half_precision: bool,
    /// Whether the engine is loaded.
    pub models_loaded: bool,
}

/// Guarantees at-most-once construction of the inference engine.
pub struct LifecycleManager {
    catalog: ModelCatalog,
    fetcher: Arc<dyn ArtifactFetcher>,
    loader: Arc<dyn EngineLoader>,
    /// GPU name resolved once at startup, `None` on CPU-only hosts.
    gpu: Option<String>,
    /// Spans the whole check-download-load sequence, not just the flag.
    init_lock: Mutex<()>,
    /// Publishes only a fully-constructed engine; setting it is the
    /// `initialized` transition and it never reverts.
    engine: OnceLock<Arc<dyn ImageEnhancer>>,
}

impl LifecycleManager {
    /// Wire the manager up with its collaborators. The hardware probe runs
    /// once here; the device does not change while the process lives.
    pub fn new(
        catalog: ModelCatalog,
        fetcher: Arc<dyn ArtifactFetcher>,
        loader: Arc<dyn EngineLoader>,
        probe: &dyn SystemProbe,
    ) -> Self {
        let gpu = probe.gpu_name();
        match &gpu {
            Some(name) => tracing::info!(gpu = %name, "inference device: CUDA"),
            None => tracing::info!("inference device: CPU"),
        }
        Self {
            catalog,
            fetcher,
            loader,
            gpu,
            init_lock: Mutex::new(()),
            engine: OnceLock::new(),
        }
    }

    /// The catalog this manager serves.
    #[must_use]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Whether the engine has been constructed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// The loaded engine, or `NotReady` before initialization completes.
    pub fn engine(&self) -> CoreResult<Arc<dyn ImageEnhancer>> {
        self.engine.get().cloned().ok_or(CoreError::NotReady)
    }

    /// Device and readiness summary.
    #[must_use]
    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            gpu_detected: self.gpu.clone().unwrap_or_else(|| "CPU".to_string()),
            half_precision: self.gpu.is_some(),
            models_loaded: self.is_initialized(),
        }
    }

    /// Download every missing checkpoint, construct the engine once, and
    /// emit the device summary followed by `ready`.
    ///
    /// Idempotent: when the engine is already loaded this short-circuits to
    /// the summary events without side effects. On the first download
    /// failure the sequence aborts (later specs are not attempted), a
    /// `model_init_error` event names the failing model, and the error is
    /// returned; a later call retries from scratch.
    pub async fn ensure_ready(&self, events: &EventSender) -> CoreResult<()> {
        let _guard = self.init_lock.lock().await;

        if self.engine.get().is_some() {
            self.emit_ready(events).await;
            return Ok(());
        }

        for spec in self.catalog.missing()? {
            tracing::info!(model = %spec.name, url = %spec.source_url, "downloading model");
            if let Err(err) = self.fetcher.fetch(&spec, events).await {
                tracing::error!(model = %spec.name, error = %err, "model download failed");
                let _ = events
                    .send(ProgressEvent::model_init_error(&spec.name, err.to_string()))
                    .await;
                return Err(err);
            }
        }

        tracing::info!("loading models into memory");
        let engine = self.loader.load(&self.catalog).await?;
        let _ = self.engine.set(engine);
        tracing::info!("all models loaded and ready");

        self.emit_ready(events).await;
        Ok(())
    }

    /// Download a single catalog entry, without constructing the engine.
    ///
    /// Serialized against `ensure_ready` by the same lock so two sessions
    /// never append to the same weight file. A checkpoint that is already
    /// on disk short-circuits to a `completed` event.
    pub async fn download_one(&self, name: &str, events: &EventSender) -> CoreResult<()> {
        let spec = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::unknown_model(name))?;

        let _guard = self.init_lock.lock().await;

        if spec.is_present()? {
            tracing::debug!(model = %spec.name, "checkpoint already on disk");
            let _ = events.send(ProgressEvent::completed(&spec.name)).await;
            return Ok(());
        }

        tracing::info!(model = %spec.name, url = %spec.source_url, "downloading model");
        self.fetcher.fetch(&spec, events).await
    }

    async fn emit_ready(&self, events: &EventSender) {
        let info = self.system_info();
        let _ = events
            .send(ProgressEvent::Info {
                gpu_detected: info.gpu_detected,
                half_precision: info.half_precision,
            })
            .await;
        let _ = events.send(ProgressEvent::Ready).await;
    }
}
