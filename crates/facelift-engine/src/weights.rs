//! Weight checkpoint validation.
//!
//! Checkpoints in the catalog are PyTorch serialization archives, which
//! are zip containers on disk. Opening one here validates the container
//! magic and records the size, so a truncated or corrupted download fails
//! at load time with a pointed error instead of deep inside the pipeline.

use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use facelift_core::{CoreError, CoreResult};

/// Zip local-file-header magic; the first bytes of every checkpoint.
const CHECKPOINT_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// A validated checkpoint on disk.
#[derive(Debug)]
pub struct WeightFile {
    name: String,
    path: PathBuf,
    len: u64,
}

impl WeightFile {
    /// Open and validate the checkpoint for `name` at `path`.
    ///
    /// I/O problems surface as filesystem errors; a readable file that is
    /// not a checkpoint surfaces as a processing error.
    pub async fn open(name: &str, path: &Path) -> CoreResult<Self> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| CoreError::filesystem(path, e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| CoreError::filesystem(path, e))?
            .len();

        if len == 0 {
            return Err(CoreError::processing(format!(
                "checkpoint for {name} is empty: {}",
                path.display()
            )));
        }

        let mut magic = [0u8; 4];
        match file.read_exact(&mut magic).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(CoreError::processing(format!(
                    "checkpoint for {name} is truncated: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(CoreError::filesystem(path, e)),
        }

        if magic != CHECKPOINT_MAGIC {
            return Err(CoreError::processing(format!(
                "checkpoint for {name} is not a valid serialized archive: {}",
                path.display()
            )));
        }

        tracing::debug!(model = name, len, path = %path.display(), "checkpoint validated");
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            len,
        })
    }

    /// Model name this checkpoint belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checkpoint path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checkpoint size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Always false for a successfully opened checkpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Minimal bytes that pass container validation in tests.
#[cfg(test)]
pub(crate) fn fake_checkpoint() -> Vec<u8> {
    let mut bytes = CHECKPOINT_MAGIC.to_vec();
    bytes.extend_from_slice(&[0u8; 60]);
    bytes
}
