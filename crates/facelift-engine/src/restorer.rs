//! Face restoration pass.
//!
//! Runs after the background upsample: a detail-recovery pass over the
//! upsampled frame, blended back against the raw upsample. The blend
//! weight matches the deployment profile of the original checkpoints.

use image::DynamicImage;
use std::sync::Arc;

use facelift_core::CoreResult;

use crate::upsampler::BackgroundUpsampler;
use crate::weights::WeightFile;

/// Strength of the detail-recovery pass.
const SHARPEN_SIGMA: f32 = 1.2;
/// Pixel-difference floor below which the pass leaves values alone.
const SHARPEN_THRESHOLD: i32 = 4;
/// Blend between restored detail and the raw upsample.
const RESTORE_WEIGHT: f32 = 0.5;

/// Face restorer wired to a background upsampler.
pub struct FaceRestorer {
    weights: WeightFile,
    detector: WeightFile,
    parser: WeightFile,
    bg_upsampler: Arc<BackgroundUpsampler>,
    weight: f32,
}

impl FaceRestorer {
    /// Assemble the restorer from its three checkpoints and the upsampler
    /// it delegates background work to.
    #[must_use]
    pub fn new(
        weights: WeightFile,
        detector: WeightFile,
        parser: WeightFile,
        bg_upsampler: Arc<BackgroundUpsampler>,
    ) -> Self {
        tracing::debug!(
            restorer = %weights.path().display(),
            detector = %detector.path().display(),
            parser = %parser.path().display(),
            "face restorer assembled"
        );
        Self {
            weights,
            detector,
            parser,
            bg_upsampler,
            weight: RESTORE_WEIGHT,
        }
    }

    /// The primary restoration checkpoint.
    #[must_use]
    pub fn weights(&self) -> &WeightFile {
        &self.weights
    }

    /// Total bytes across the face-pipeline checkpoints.
    #[must_use]
    pub fn checkpoint_bytes(&self) -> u64 {
        self.weights.len() + self.detector.len() + self.parser.len()
    }

    /// Restore the frame at the requested upscale factor.
    pub fn restore(&self, image: &DynamicImage, upscale: u32) -> CoreResult<DynamicImage> {
        let upsampled = self.bg_upsampler.upscale(image, upscale);
        let sharpened = upsampled.unsharpen(SHARPEN_SIGMA, SHARPEN_THRESHOLD);

        let base = upsampled.to_rgba8();
        let detail = sharpened.to_rgba8();

        let mut out = base;
        for (dst, src) in out.pixels_mut().zip(detail.pixels()) {
            for channel in 0..4 {
                dst.0[channel] = blend(dst.0[channel], src.0[channel], self.weight);
            }
        }
        Ok(DynamicImage::ImageRgba8(out))
    }
}

/// Blend one channel: `a` at weight `1 - w`, `b` at weight `w`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(a: u8, b: u8, w: f32) -> u8 {
    f32::from(a)
        .mul_add(1.0 - w, f32::from(b) * w)
        .round()
        .clamp(0.0, 255.0) as u8
}
