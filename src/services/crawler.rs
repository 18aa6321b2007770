// src/services/crawler.rs

//! Module detail crawling.
//!
//! Detail retrieval runs on a bounded worker pool; each worker fetches one
//! detail page (with retry), extracts the record and enforces the
//! per-worker request delay. The consumer loop below `buffer_unordered` is
//! the single owner of the checkpoint and the progress counters, so
//! workers never touch shared mutable state. Work is idempotent (pure
//! reads of the source), so a killed process simply resumes from the
//! checkpoint: at-least-once per item.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, ModuleRecord, ModuleRef};
use crate::services::extractor::{extract_module_detail, extract_module_list};
use crate::services::fetcher::{Fetcher, RetryPolicy, fetch_with_retry};
use crate::storage::CheckpointStore;

/// Summary of one detail-crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// All extracted records, including those reused from the checkpoint
    pub records: Vec<ModuleRecord>,

    /// Items newly completed in this run
    pub completed: usize,

    /// Items that failed permanently in this run
    pub failed: usize,

    /// Items skipped because the checkpoint already had them
    pub resumed: usize,

    /// Keys of the failed items, retried on the next run
    pub failed_keys: Vec<String>,
}

/// Service crawling the module catalog through a [`Fetcher`].
pub struct ModuleCrawler {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    policy: RetryPolicy,
}

impl ModuleCrawler {
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn Fetcher>) -> Self {
        let policy = RetryPolicy::from_config(&config.crawler);
        Self {
            config,
            fetcher,
            policy,
        }
    }

    /// Fetch and extract the catalog list page. The result may contain
    /// exact duplicates; deduplication is the caller's next stage.
    pub async fn fetch_module_list(&self) -> Result<Vec<ModuleRef>> {
        let base_url = &self.config.crawler.base_url;
        let html = fetch_with_retry(self.fetcher.as_ref(), base_url, &self.policy).await?;
        let modules = extract_module_list(&html, base_url)?;
        log::info!("Catalog list: {} raw entries", modules.len());
        Ok(modules)
    }

    /// Fetch detail pages for all given modules, resuming from and
    /// maintaining the checkpoint.
    ///
    /// The checkpoint is persisted after every `batch_size` newly
    /// completed items and once more when the pool has drained, bounding
    /// re-work after an interruption to one batch.
    pub async fn fetch_details(
        &self,
        modules: Vec<ModuleRef>,
        checkpoint_store: &CheckpointStore,
    ) -> Result<CrawlOutcome> {
        let mut checkpoint = checkpoint_store.load().await?;

        // Checkpoint state for keys no longer listed is dropped, so an
        // entry removed from the catalog between runs cannot survive into
        // the new snapshot via a resumed partial record.
        let current_keys: HashSet<String> = modules.iter().map(|m| m.key()).collect();
        checkpoint.retain_keys(&current_keys);

        // Completed keys are skipped on resume; failed and never-attempted
        // keys are (re)tried.
        let mut jobs = Vec::new();
        let mut resumed = 0;
        for module in modules {
            let key = module.key();
            if checkpoint.is_completed(&key) && checkpoint.partial.contains_key(&key) {
                resumed += 1;
            } else {
                jobs.push(module);
            }
        }

        let total = jobs.len();
        if resumed > 0 {
            log::info!("Resuming: {} items already completed, {} to go", resumed, total);
        }

        let concurrency = self.config.crawler.max_concurrent.max(1);
        let mut detail_stream = stream::iter(jobs)
            .map(|module| self.fetch_module_record(module))
            .buffer_unordered(concurrency);

        // Single-writer discipline: only this loop mutates the checkpoint
        // and the counters.
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut batch_pending = 0usize;
        let batch_size = self.config.crawler.batch_size.max(1);

        while let Some((key, result)) = detail_stream.next().await {
            match result {
                Ok(record) => {
                    checkpoint.mark_completed(record);
                    completed += 1;
                    batch_pending += 1;
                    log::info!("[{}/{}] {} ✓", completed + failed, total, key);

                    if batch_pending >= batch_size {
                        checkpoint_store.save(&checkpoint).await?;
                        batch_pending = 0;
                        log::info!("Checkpoint saved ({} completed)", checkpoint.completed.len());
                    }
                }
                Err(error) => {
                    checkpoint.mark_failed(key.clone());
                    failed += 1;
                    log::warn!("[{}/{}] {} ✗ {}", completed + failed, total, key, error);
                }
            }
        }
        drop(detail_stream);

        checkpoint_store.save(&checkpoint).await?;

        let failed_keys = checkpoint.failed.clone();
        let records = checkpoint.partial.into_values().collect();
        Ok(CrawlOutcome {
            records,
            completed,
            failed,
            resumed,
            failed_keys,
        })
    }

    /// Worker unit: fetch one detail page, extract it and enforce the
    /// per-worker inter-request delay. Blocking stays confined here.
    async fn fetch_module_record(&self, module: ModuleRef) -> (String, Result<ModuleRecord>) {
        let key = module.key();
        let result = self.try_fetch_module_record(&module).await;

        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (key, result)
    }

    async fn try_fetch_module_record(&self, module: &ModuleRef) -> Result<ModuleRecord> {
        let html = fetch_with_retry(self.fetcher.as_ref(), &module.detail_url, &self.policy).await?;
        let detail = extract_module_detail(&html)?;

        Ok(ModuleRecord {
            module_number: module.module_number.clone(),
            version: module.version.clone(),
            title: module.title.clone(),
            publication_date: detail.publication_date,
            content_hash: detail.content_hash,
            goals: detail.goals,
            professions: detail.professions,
            last_checked: Utc::now().to_rfc3339(),
        })
    }
}
