// src/storage/checkpoint.rs

//! Durable crawl progress for resumable runs.
//!
//! The checkpoint records which version keys finished, which failed, and
//! the partial records already extracted, so an interrupted run resumes
//! without re-fetching finished items. It is written at batch boundaries
//! during a crawl and deleted once the snapshot is safely on disk.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ModuleRecord;

/// Transient working state of one crawl run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    /// Keys whose detail extraction completed
    pub completed: Vec<String>,

    /// Keys that failed permanently in this run; retried on resume
    pub failed: Vec<String>,

    /// Extracted records by key, reused on resume
    pub partial: BTreeMap<String, ModuleRecord>,
}

impl Checkpoint {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failed.is_empty() && self.partial.is_empty()
    }

    pub fn is_completed(&self, key: &str) -> bool {
        self.completed.iter().any(|k| k == key)
    }

    /// Record a finished item, clearing any earlier failure for the key.
    pub fn mark_completed(&mut self, record: ModuleRecord) {
        let key = record.key();
        self.failed.retain(|k| k != &key);
        if !self.is_completed(&key) {
            self.completed.push(key.clone());
        }
        self.partial.insert(key, record);
    }

    /// Record a permanent failure for the key.
    pub fn mark_failed(&mut self, key: String) {
        if !self.failed.contains(&key) {
            self.failed.push(key);
        }
    }

    /// Drop all state for keys absent from the current catalog list.
    /// Entries removed from the source between an interrupted run and its
    /// resume must not leak into the new snapshot.
    pub fn retain_keys(&mut self, keys: &HashSet<String>) {
        self.completed.retain(|k| keys.contains(k));
        self.failed.retain(|k| keys.contains(k));
        self.partial.retain(|k, _| keys.contains(k));
    }
}

/// File-backed checkpoint persistence with atomic overwrite.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted checkpoint, empty when none exists.
    pub async fn load(&self) -> Result<Checkpoint> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Checkpoint::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Persist the checkpoint atomically (write to temp, then rename).
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(checkpoint)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Remove the checkpoint file. Missing file is not an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
