// src/pipeline/crawl.rs

//! Full crawl pipeline.
//!
//! List → dedupe → concurrent detail crawl → aggregate → snapshot. The
//! previous current snapshot is backed up before being replaced so change
//! detection always has a comparison base, and the checkpoint is deleted
//! only once the new snapshot is safely on disk.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Snapshot};
use crate::pipeline::aggregate::aggregate;
use crate::pipeline::dedup::dedupe_modules;
use crate::services::crawler::ModuleCrawler;
use crate::services::fetcher::Fetcher;
use crate::storage::{CheckpointStore, SnapshotStorage};

/// Run the full crawl and persist the resulting snapshot.
pub async fn run_crawl(
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    storage: &dyn SnapshotStorage,
    checkpoint_store: &CheckpointStore,
) -> Result<Snapshot> {
    let crawler = ModuleCrawler::new(Arc::clone(&config), fetcher);

    log::info!("[1/4] Loading module list...");
    let raw_modules = crawler.fetch_module_list().await?;
    let unique_modules = dedupe_modules(raw_modules.clone());
    log::info!(
        "Deduplicated: {} raw, {} duplicates, {} unique",
        raw_modules.len(),
        raw_modules.len() - unique_modules.len(),
        unique_modules.len()
    );

    log::info!("[2/4] Fetching {} module details...", unique_modules.len());
    let outcome = crawler.fetch_details(unique_modules, checkpoint_store).await?;
    if outcome.failed > 0 {
        log::warn!(
            "{} items failed permanently and will be retried on the next run: {:?}",
            outcome.failed,
            outcome.failed_keys
        );
    }

    // Aggregation is strictly single-threaded and runs only after the
    // worker pool has drained.
    log::info!("[3/4] Aggregating {} records...", outcome.records.len());
    let (masters, professions) = aggregate(outcome.records);
    let snapshot = Snapshot::new(&config.crawler.base_url, masters, professions);

    log::info!("[4/4] Writing snapshot...");
    if let Some(backup) = storage.backup_current().await? {
        log::info!("Previous snapshot backed up to {}", backup);
    }
    let meta = storage.write_snapshot(&snapshot).await?;
    checkpoint_store.clear().await?;

    log::info!(
        "Snapshot written to {}: {} masters, {} versions, {} professions ({} completed, {} resumed, {} failed)",
        meta.location,
        snapshot.meta.master_count,
        snapshot.meta.version_count,
        snapshot.meta.profession_count,
        outcome.completed,
        outcome.resumed,
        outcome.failed
    );

    Ok(snapshot)
}
