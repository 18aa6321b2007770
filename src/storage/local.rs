//! Local filesystem snapshot storage.
//!
//! Keeps the current snapshot at `{root}/module-master.json` and a dated
//! copy per run day under `{root}/backups/`, so a later run always has a
//! comparison base for change detection. All writes go through a temp file
//! and rename, so a crash never leaves a half-written snapshot behind.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{PathsConfig, Snapshot};
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    snapshot_path: PathBuf,
    backup_dir: PathBuf,
}

impl LocalStorage {
    /// Create storage rooted at the given data directory, using the
    /// configured file layout.
    pub fn new(root: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        let root = root.into();
        Self {
            snapshot_path: paths.snapshot_path(&root),
            backup_dir: paths.backup_path(&root),
        }
    }

    /// Write JSON atomically (write to temp, then rename).
    async fn write_json<T: Serialize + ?Sized>(&self, path: &PathBuf, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read JSON, returning `None` if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, path: &PathBuf) -> Result<Option<T>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Backup file name for a snapshot created on `date` (`YYYY-MM-DD`).
    fn backup_path_for(&self, date: &str) -> PathBuf {
        self.backup_dir.join(format!("module-master-{}.json", date))
    }

    /// Backup files sorted by name; the date suffix makes that
    /// chronological.
    async fn sorted_backups(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("module-master-") && name.ends_with(".json") {
                backups.push(path);
            }
        }
        backups.sort();
        Ok(backups)
    }
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteMetadata> {
        self.write_json(&self.snapshot_path, snapshot).await?;
        Ok(WriteMetadata {
            location: self.snapshot_path.display().to_string(),
            timestamp: Utc::now(),
        })
    }

    async fn load_current(&self) -> Result<Option<Snapshot>> {
        self.read_json(&self.snapshot_path).await
    }

    async fn backup_current(&self) -> Result<Option<String>> {
        let Some(snapshot) = self.load_current().await? else {
            return Ok(None);
        };

        let backup_path = self.backup_path_for(snapshot.created_date());
        self.write_json(&backup_path, &snapshot).await?;
        Ok(Some(backup_path.display().to_string()))
    }

    async fn load_latest_backup(&self) -> Result<Option<Snapshot>> {
        let backups = self.sorted_backups().await?;
        let Some(latest) = backups.last() else {
            return Ok(None);
        };
        self.read_json(latest).await
    }
}
