//! Local-disk media store
//!
//! Uploaded blobs are written under a single configurable root directory.
//! Stored names combine owner id, upload timestamp, a random token, and
//! the original file name; the token keeps repeated uploads of the same
//! file in the same second from colliding.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::core::config::MediaStorageConfig;
use crate::core::error::AppError;

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(config: &MediaStorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a blob and return the path it was stored at.
    /// The root directory is created on demand.
    pub async fn write(
        &self,
        owner_id: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create storage directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let stored_name = format!(
            "{}_{}_{}_{}",
            owner_id,
            Utc::now().timestamp(),
            Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let path = self.root.join(stored_name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!("Stored media blob at {}", path.display());
        Ok(path)
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, AppError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", path.display(), e)))
    }

    /// Delete a blob. A missing file is not an error.
    pub async fn delete(&self, path: &Path) -> Result<(), AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Keep stored names flat: strip any path components from the client name
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    if base.is_empty() {
        "unnamed".to_string()
    } else {
        base.to_string()
    }
}
