//! Core domain types and port definitions for facelift.
//!
//! This crate owns the model catalog, the progress-event vocabulary, the
//! error taxonomy and the model lifecycle service. Adapters (the download
//! crate, the inference engine, the web server) implement the ports defined
//! here and are wired together at the composition root.

pub mod catalog;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod paths;
pub mod ports;
pub mod util;

// Re-export commonly used types for convenience
pub use catalog::{ModelCatalog, ModelSpec};
pub use error::{CoreError, CoreResult};
pub use events::ProgressEvent;
pub use lifecycle::{LifecycleManager, SystemInfo};
pub use paths::{AppPaths, ensure_directory};
pub use ports::{ArtifactFetcher, EngineLoader, EventSender, ImageEnhancer, SystemProbe};
pub use util::{format_bytes, format_speed, sanitize_filename};
