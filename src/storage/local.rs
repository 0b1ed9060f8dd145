//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// Single-file JSON snapshot store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn save(&self, snapshot: &Snapshot) -> Result<DateTime<Utc>> {
        let saved_at = Utc::now();
        let record = Snapshot {
            saved_at: Some(saved_at),
            ..snapshot.clone()
        };

        let bytes = serde_json::to_vec_pretty(&record).map_err(AppError::cache_write)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::cache_write(format!("{}: {}", self.path.display(), e)))?;

        log::debug!("Snapshot saved to {}", self.path.display());
        Ok(saved_at)
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = self
            .read_bytes()
            .await
            .map_err(|e| AppError::cache_read(format!("{}: {}", self.path.display(), e)))?;

        match bytes {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::cache_read(format!("{}: {}", self.path.display(), e))),
            None => {
                log::debug!("No snapshot stored at {}", self.path.display());
                Ok(None)
            }
        }
    }
}
