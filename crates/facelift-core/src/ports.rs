//! Ports implemented by the adapter crates.
//!
//! Core stays pure: downloads, weight loading and hardware probing are
//! behind these traits, and the concrete implementations are injected at
//! the composition root.

use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::catalog::{ModelCatalog, ModelSpec};
use crate::error::CoreResult;
use crate::events::ProgressEvent;

/// Channel end that progress events are delivered through.
///
/// Senders ignore delivery failures: a dropped receiver means the consumer
/// went away, which never cancels the work producing the events.
pub type EventSender = mpsc::Sender<ProgressEvent>;

/// Port for fetching one weight artifact to its target path.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `spec` to `spec.target_path()`, resuming any partial file
    /// found there. Progress is delivered through `events`, ending with a
    /// terminal `completed` or `error` event that matches the returned
    /// result. Each call is an independent session.
    async fn fetch(&self, spec: &ModelSpec, events: &EventSender) -> CoreResult<()>;
}

/// Port for the loaded restoration/upscaling capability.
pub trait ImageEnhancer: Send + Sync {
    /// Enhance a decoded bitmap, upscaling by `upscale`.
    ///
    /// The factor is a per-call parameter; implementations hold no mutable
    /// request state, so concurrent calls with different factors are safe.
    fn enhance(&self, image: &DynamicImage, upscale: u32) -> CoreResult<DynamicImage>;
}

/// Port for constructing the engine once every checkpoint is on disk.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Build the enhancer from the catalog's weight paths.
    async fn load(&self, catalog: &ModelCatalog) -> CoreResult<Arc<dyn ImageEnhancer>>;
}

/// Port for probing the inference hardware.
pub trait SystemProbe: Send + Sync {
    /// Name of the detected GPU, or `None` when inference falls back to
    /// the CPU.
    fn gpu_name(&self) -> Option<String>;
}
