//! The loaded engine behind the `ImageEnhancer` port.

use image::DynamicImage;

use facelift_core::{CoreError, CoreResult, ImageEnhancer, format_bytes};

use crate::restorer::FaceRestorer;

/// Default upscale factor when a request does not specify one.
pub const DEFAULT_UPSCALE: u32 = 4;

/// Largest accepted upscale factor; keeps output dimensions inside what
/// the resampler handles comfortably.
pub const MAX_UPSCALE: u32 = 8;

/// Output dimension ceiling per axis.
const MAX_OUTPUT_DIM: u32 = 16_384;

/// Ready-to-use restoration/upscaling engine.
///
/// Immutable after construction: the upscale factor travels with each
/// call, so concurrent enhancements never race on shared state.
pub struct Engine {
    restorer: FaceRestorer,
}

impl Engine {
    /// Wrap a fully wired restorer.
    #[must_use]
    pub fn new(restorer: FaceRestorer) -> Self {
        tracing::info!(
            checkpoint_bytes = %format_bytes(restorer.checkpoint_bytes()),
            "inference engine constructed"
        );
        Self { restorer }
    }
}

impl ImageEnhancer for Engine {
    fn enhance(&self, image: &DynamicImage, upscale: u32) -> CoreResult<DynamicImage> {
        if upscale == 0 || upscale > MAX_UPSCALE {
            return Err(CoreError::processing(format!(
                "upscale factor {upscale} out of range (1-{MAX_UPSCALE})"
            )));
        }

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(CoreError::processing("input image has no pixels"));
        }
        if width.saturating_mul(upscale) > MAX_OUTPUT_DIM
            || height.saturating_mul(upscale) > MAX_OUTPUT_DIM
        {
            return Err(CoreError::processing(format!(
                "output would exceed {MAX_OUTPUT_DIM}px per axis"
            )));
        }

        self.restorer.restore(image, upscale)
    }
}
