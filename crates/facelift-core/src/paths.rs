//! On-disk layout of the application data directory.
//!
//! Everything the server touches lives under one data root: uploaded
//! originals, enhanced outputs and the model weight directories. Partial
//! downloads are ordinary truncated files at their final weight path, so a
//! crash mid-download leaves a resumable artifact rather than a stray temp
//! file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Resolved directory layout under a single data root.
#[derive(Clone, Debug)]
pub struct AppPaths {
    data_root: PathBuf,
}

impl AppPaths {
    /// Create a layout rooted at `data_root`. No directories are touched
    /// until [`AppPaths::prepare`] runs.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// The data root itself.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Directory uploaded originals are written to.
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.data_root.join("inputs")
    }

    /// Directory enhanced results are written to.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.data_root.join("outputs")
    }

    /// Weight directory for the face-restoration checkpoints.
    #[must_use]
    pub fn gfpgan_weights_dir(&self) -> PathBuf {
        self.data_root.join("gfpgan").join("weights")
    }

    /// Weight directory for the background-upsampler checkpoint.
    #[must_use]
    pub fn realesrgan_weights_dir(&self) -> PathBuf {
        self.data_root.join("realesrgan").join("models")
    }

    /// Create every directory in the layout and verify each is writable.
    pub fn prepare(&self) -> CoreResult<()> {
        for dir in [
            self.input_dir(),
            self.output_dir(),
            self.gfpgan_weights_dir(),
            self.realesrgan_weights_dir(),
        ] {
            ensure_directory(&dir)?;
        }
        Ok(())
    }
}

/// Ensure a directory exists (creating parents as needed) and is writable.
pub fn ensure_directory(path: &Path) -> CoreResult<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(CoreError::filesystem(path, "not a directory"));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::filesystem(path, e))?;
    }
    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a probe file.
fn verify_writable(path: &Path) -> CoreResult<()> {
    let probe = path.join(".facelift_write_test");
    let result = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe);

    match result {
        Ok(mut file) => {
            file.write_all(b"test")
                .map_err(|e| CoreError::filesystem(path, e))?;
            drop(file);
            let _ = fs::remove_file(&probe);
            Ok(())
        }
        Err(err) => Err(CoreError::filesystem(path, err)),
    }
}
