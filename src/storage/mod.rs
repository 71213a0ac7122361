// Filesystem-backed result store
//
// One image file per upload, one JSON file per processed result, both
// named by the generated image id. Concurrent requests use distinct ids
// and never contend on the same file, so no locking is needed. Writing a
// result is best-effort: a failed write is logged and the response is
// still served from memory.

use crate::core::errors::{StoreError, StoreResult};
use crate::core::types::ProcessingResult;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub struct ResultStore {
    upload_dir: PathBuf,
    results_dir: PathBuf,
}

impl ResultStore {
    /// Create the store, ensuring both directories exist
    pub fn new(upload_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        let results_dir = results_dir.into();

        std::fs::create_dir_all(&upload_dir).context("Failed to create upload directory")?;
        std::fs::create_dir_all(&results_dir).context("Failed to create results directory")?;

        Ok(Self {
            upload_dir,
            results_dir,
        })
    }

    fn upload_path(&self, image_id: &str) -> PathBuf {
        self.upload_dir.join(format!("{image_id}.png"))
    }

    fn result_path(&self, image_id: &str) -> PathBuf {
        self.results_dir.join(format!("{image_id}.json"))
    }

    /// Persist the raw upload under its generated id
    pub fn save_upload(&self, image_id: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.upload_path(image_id);
        std::fs::write(&path, bytes).map_err(|source| StoreError::Io {
            image_id: image_id.to_string(),
            source,
        })?;
        debug!("Image saved to {}", path.display());
        Ok(())
    }

    /// Remove a saved upload. Used for cleanup when processing fails
    /// outright after the file was written; the pipeline must never
    /// leave an orphaned upload behind a 5xx.
    pub fn delete_upload(&self, image_id: &str) {
        let path = self.upload_path(image_id);
        if path.exists() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Cleaned up uploaded file: {}", path.display()),
                Err(e) => error!("Failed to clean up file {}: {}", path.display(), e),
            }
        }
    }

    /// Serialize a finished result to disk. Failure is logged, not fatal:
    /// the caller still holds the in-memory result.
    pub fn put(&self, result: &ProcessingResult) {
        let path = self.result_path(&result.image_id);
        let write = serde_json::to_vec_pretty(result)
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));

        match write {
            Ok(()) => info!("Results saved for {}", result.image_id),
            Err(e) => error!("Failed to save results for {}: {:#}", result.image_id, e),
        }
    }

    /// Retrieve a stored result. Distinguishes a missing result from a
    /// stored file that no longer parses as the result schema.
    pub fn get(&self, image_id: &str) -> StoreResult<ProcessingResult> {
        let path = self.result_path(image_id);
        if !path.exists() {
            return Err(StoreError::NotFound(image_id.to_string()));
        }

        let data = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            image_id: image_id.to_string(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            image_id: image_id.to_string(),
            source,
        })
    }

    pub fn has_upload(&self, image_id: &str) -> bool {
        self.upload_path(image_id).exists()
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}
