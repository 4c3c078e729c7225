//! Inference engine for facelift.
//!
//! Implements the core ports for hardware probing, engine construction and
//! enhancement. The restoration pipeline is assembled from the validated
//! weight checkpoints in the construction order the lifecycle manager
//! relies on: face-restoration weights first, then the background
//! upsampler, then the wiring between the two.

mod device;
mod engine;
mod loader;
mod restorer;
mod upsampler;
mod weights;

pub use device::DefaultSystemProbe;
pub use engine::{DEFAULT_UPSCALE, Engine, MAX_UPSCALE};
pub use loader::EngineBuilder;
pub use restorer::FaceRestorer;
pub use upsampler::BackgroundUpsampler;
pub use weights::WeightFile;
