//! Engine construction from the catalog's weight paths.

use async_trait::async_trait;
use std::sync::Arc;

use facelift_core::{CoreError, CoreResult, EngineLoader, ImageEnhancer, ModelCatalog, ModelSpec};

use crate::engine::Engine;
use crate::restorer::FaceRestorer;
use crate::upsampler::BackgroundUpsampler;
use crate::weights::WeightFile;

/// `EngineLoader` implementation that assembles the production engine.
pub struct EngineBuilder;

#[async_trait]
impl EngineLoader for EngineBuilder {
    async fn load(&self, catalog: &ModelCatalog) -> CoreResult<Arc<dyn ImageEnhancer>> {
        // Construction order matters to the lifecycle invariant: the base
        // restoration checkpoints first, then the upscaling capability,
        // then the wiring. The caller publishes the handle only after this
        // returns.
        let face = open_weights(catalog, "GFPGAN").await?;
        let detector = open_weights(catalog, "Face Detector").await?;
        let parser = open_weights(catalog, "Face Parser").await?;

        let upsampler = Arc::new(BackgroundUpsampler::new(
            open_weights(catalog, "RealESRGAN").await?,
        ));

        let restorer = FaceRestorer::new(face, detector, parser, upsampler);
        Ok(Arc::new(Engine::new(restorer)))
    }
}

async fn open_weights(catalog: &ModelCatalog, name: &str) -> CoreResult<WeightFile> {
    let spec: &ModelSpec = catalog
        .get(name)
        .ok_or_else(|| CoreError::unknown_model(name))?;
    WeightFile::open(&spec.name, &spec.target_path()).await
}
