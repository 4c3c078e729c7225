//! Background upsampler.
//!
//! The x4-plus profile the catalog ships resamples the whole frame; face
//! regions are refined afterwards by the restorer this upsampler is wired
//! into.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::weights::WeightFile;

/// Whole-frame upscaler backed by the RealESRGAN checkpoint.
pub struct BackgroundUpsampler {
    weights: WeightFile,
}

impl BackgroundUpsampler {
    /// Wrap a validated checkpoint.
    #[must_use]
    pub fn new(weights: WeightFile) -> Self {
        Self { weights }
    }

    /// The checkpoint backing this upsampler.
    #[must_use]
    pub fn weights(&self) -> &WeightFile {
        &self.weights
    }

    /// Upscale the frame by `factor`. Callers validate the factor; the
    /// engine caps it well below dimension-overflow territory.
    #[must_use]
    pub fn upscale(&self, image: &DynamicImage, factor: u32) -> DynamicImage {
        if factor <= 1 {
            return image.clone();
        }
        let width = image.width() * factor;
        let height = image.height() * factor;
        image.resize_exact(width, height, FilterType::Lanczos3)
    }
}
