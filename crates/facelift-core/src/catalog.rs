//! Static registry of the weight artifacts the engine depends on.
//!
//! The catalog is the single source of truth for what has to be on disk
//! before the engine can load. Specs are immutable, defined at process
//! start, and identified by name.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::paths::AppPaths;

/// Static descriptor of one required weight artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Unique model name, e.g. `GFPGAN`.
    pub name: String,
    /// File name of the checkpoint on disk.
    pub filename: String,
    /// Where the artifact is fetched from.
    pub source_url: String,
    /// Directory the checkpoint lands in.
    pub dest_dir: PathBuf,
}

impl ModelSpec {
    /// Full path of the checkpoint on disk.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        self.dest_dir.join(&self.filename)
    }

    /// Whether the checkpoint exists on disk. `NotFound` means absent; any
    /// other probe failure is surfaced as a filesystem error.
    pub fn is_present(&self) -> CoreResult<bool> {
        let path = self.target_path();
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::filesystem(&path, e)),
        }
    }
}

/// Registration-ordered collection of [`ModelSpec`]s.
#[derive(Clone, Debug)]
pub struct ModelCatalog {
    specs: Vec<ModelSpec>,
}

impl ModelCatalog {
    /// Build a catalog from explicit specs. Order is preserved; downloads
    /// run in registration order so sequencing is reproducible.
    #[must_use]
    pub fn new(specs: Vec<ModelSpec>) -> Self {
        Self { specs }
    }

    /// The four checkpoints the restoration pipeline ships with, laid out
    /// under the given data root.
    #[must_use]
    pub fn builtin(paths: &AppPaths) -> Self {
        const RELEASE_BASE: &str =
            "https://github.com/Md-Siam-Mia-Code/PicturePerfect/releases/download/1.0.0";

        let gfpgan_dir = paths.gfpgan_weights_dir();
        let spec = |name: &str, filename: &str, dest_dir: PathBuf| ModelSpec {
            name: name.to_string(),
            filename: filename.to_string(),
            source_url: format!("{RELEASE_BASE}/{filename}"),
            dest_dir,
        };

        Self::new(vec![
            spec("GFPGAN", "GFPGANv1.4.pth", gfpgan_dir.clone()),
            spec(
                "RealESRGAN",
                "RealESRGAN_x4plus.pth",
                paths.realesrgan_weights_dir(),
            ),
            // The helper models live next to the face-restoration weights.
            spec(
                "Face Detector",
                "detection_Resnet50_Final.pth",
                gfpgan_dir.clone(),
            ),
            spec("Face Parser", "parsing_parsenet.pth", gfpgan_dir),
        ])
    }

    /// All registered specs, in registration order.
    #[must_use]
    pub fn specs(&self) -> &[ModelSpec] {
        &self.specs
    }

    /// Look up a spec by its unique name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Specs whose checkpoint is absent from disk, in registration order.
    pub fn missing(&self) -> CoreResult<Vec<ModelSpec>> {
        let mut missing = Vec::new();
        for spec in &self.specs {
            if !spec.is_present()? {
                missing.push(spec.clone());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_in(root: &std::path::Path) -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelSpec {
                name: "A".to_string(),
                filename: "a.bin".to_string(),
                source_url: "http://x/a.bin".to_string(),
                dest_dir: root.to_path_buf(),
            },
            ModelSpec {
                name: "B".to_string(),
                filename: "b.bin".to_string(),
                source_url: "http://x/b.bin".to_string(),
                dest_dir: root.to_path_buf(),
            },
        ])
    }

    #[test]
    fn missing_reports_absent_specs_in_order() {
        let root = tempfile::tempdir().unwrap();
        let catalog = catalog_in(root.path());

        let missing = catalog.missing().unwrap();
        assert_eq!(
            missing.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            ["A", "B"]
        );

        fs::write(root.path().join("a.bin"), b"weights").unwrap();
        let missing = catalog.missing().unwrap();
        assert_eq!(
            missing.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            ["B"]
        );

        fs::write(root.path().join("b.bin"), b"weights").unwrap();
        assert!(catalog.missing().unwrap().is_empty());
    }

    #[test]
    fn get_resolves_by_name() {
        let root = tempfile::tempdir().unwrap();
        let catalog = catalog_in(root.path());
        assert_eq!(catalog.get("B").unwrap().filename, "b.bin");
        assert!(catalog.get("C").is_none());
    }

    #[test]
    fn builtin_catalog_lists_all_checkpoints() {
        let paths = AppPaths::new("/data");
        let catalog = ModelCatalog::builtin(&paths);
        let names: Vec<_> = catalog.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["GFPGAN", "RealESRGAN", "Face Detector", "Face Parser"]
        );

        let gfpgan = catalog.get("GFPGAN").unwrap();
        assert!(gfpgan.source_url.ends_with("GFPGANv1.4.pth"));
        assert_eq!(gfpgan.target_path(), paths.gfpgan_weights_dir().join("GFPGANv1.4.pth"));
    }
}
