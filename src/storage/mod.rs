//! Storage abstractions for snapshot and checkpoint persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! {data_dir}/
//! ├── config.toml               # Crawler configuration
//! ├── module-master.json        # Current snapshot
//! ├── .crawl-checkpoint.json    # Transient crawl progress (deleted on success)
//! └── backups/                  # Dated snapshot backups
//!     └── module-master-YYYY-MM-DD.json
//! ```
//!
//! Persistence failures are fatal: a run that cannot write its snapshot or
//! checkpoint cannot guarantee resumability or output correctness.

pub mod checkpoint;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use checkpoint::{Checkpoint, CheckpointStore};
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Path the snapshot was written to
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Write a snapshot as the current dataset, atomically.
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteMetadata>;

    /// Load the current snapshot, `None` when no run has completed yet.
    async fn load_current(&self) -> Result<Option<Snapshot>>;

    /// Copy the current snapshot into the dated backup directory.
    /// Returns the backup path, or `None` when there is nothing to back up.
    async fn backup_current(&self) -> Result<Option<String>>;

    /// Load the most recent backup snapshot, `None` when none exist.
    async fn load_latest_backup(&self) -> Result<Option<Snapshot>>;
}
