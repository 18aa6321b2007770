//! Modulbaukasten crawler CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use modcrawl::{
    config,
    error::{AppError, Result},
    models::Snapshot,
    pipeline,
    services::HttpFetcher,
    services::fetcher::Fetcher,
    storage::{CheckpointStore, LocalStorage, SnapshotStorage},
};

/// modcrawl - Curriculum Module Catalog Crawler
#[derive(Parser, Debug)]
#[command(
    name = "modcrawl",
    version,
    about = "Crawls the Modulbaukasten catalog and tracks changes between snapshots"
)]
struct Cli {
    /// Path to the data directory (config, snapshots, checkpoint)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and write a new snapshot (resumes from checkpoint)
    Crawl {
        /// Discard any existing checkpoint and start over
        #[arg(long)]
        fresh: bool,
    },

    /// Compare two snapshots and print the update report
    Diff {
        /// Old snapshot file (default: latest backup)
        #[arg(long)]
        old: Option<PathBuf>,

        /// New snapshot file (default: current snapshot)
        #[arg(long)]
        new: Option<PathBuf>,

        /// Write the report to this file instead of only printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the configuration and optionally the current dataset
    Validate {
        /// Also run data-quality checks over the current snapshot
        #[arg(long)]
        data: bool,

        /// Write the validation report to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show current snapshot info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(config::load_from_data_dir(&cli.data_dir));
    let storage = LocalStorage::new(&cli.data_dir, &config.paths);
    let checkpoint_store = CheckpointStore::new(config.paths.checkpoint_path(&cli.data_dir));

    match cli.command {
        Command::Crawl { fresh } => {
            config.validate()?;
            if fresh {
                checkpoint_store.clear().await?;
                log::info!("Checkpoint discarded, starting fresh");
            }

            let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.crawler)?);
            pipeline::run_crawl(Arc::clone(&config), fetcher, &storage, &checkpoint_store)
                .await?;
        }

        Command::Diff { old, new, out } => {
            let old_snapshot = match old {
                Some(path) => load_snapshot_file(&path)?,
                None => storage.load_latest_backup().await?.ok_or_else(|| {
                    AppError::storage("No backup snapshot found. Run 'crawl' at least twice.")
                })?,
            };
            let new_snapshot = match new {
                Some(path) => load_snapshot_file(&path)?,
                None => storage.load_current().await?.ok_or_else(|| {
                    AppError::storage("No current snapshot found. Run 'crawl' first.")
                })?,
            };

            let changes = pipeline::diff(&old_snapshot, &new_snapshot);
            let report = pipeline::build_report(
                &changes,
                old_snapshot.created_date(),
                new_snapshot.created_date(),
            );

            println!("{}", report);

            if let Some(out_path) = out {
                std::fs::write(&out_path, &report)?;
                log::info!("Report written to {}", out_path.display());
            }
        }

        Command::Validate { data, out } => {
            log::info!("Validating configuration...");
            let config = config::load_validated(&cli.data_dir)?;
            log::info!("✓ Config OK");
            log::info!("  base_url: {}", config.crawler.base_url);
            log::info!("  max_concurrent: {}", config.crawler.max_concurrent);
            log::info!("  max_retries: {}", config.crawler.max_retries);
            log::info!("  batch_size: {}", config.crawler.batch_size);

            if data {
                let snapshot = storage.load_current().await?.ok_or_else(|| {
                    AppError::storage("No current snapshot found. Run 'crawl' first.")
                })?;
                let findings = pipeline::assess(&snapshot);
                let report = pipeline::build_validation_report(&snapshot, &findings);

                println!("{}", report);

                if let Some(out_path) = out {
                    std::fs::write(&out_path, &report)?;
                    log::info!("Validation report written to {}", out_path.display());
                }

                if !findings.meta_mismatches.is_empty() {
                    log::warn!("Snapshot meta is inconsistent with the module tree");
                }
                if findings.is_clean() {
                    log::info!("✓ Dataset complete");
                } else {
                    log::warn!(
                        "Dataset completeness: {:.1}%",
                        findings.completeness_percent()
                    );
                }
            }
        }

        Command::Info => {
            match storage.load_current().await? {
                Some(snapshot) => {
                    log::info!("Current snapshot:");
                    log::info!("  created: {}", snapshot.meta.created_at);
                    log::info!("  source: {}", snapshot.meta.source);
                    log::info!("  master modules: {}", snapshot.meta.master_count);
                    log::info!("  versions: {}", snapshot.meta.version_count);
                    log::info!("  professions: {}", snapshot.meta.profession_count);
                    log::info!("  goals: {}", snapshot.meta.goal_count);
                    log::info!("  knowledge items: {}", snapshot.meta.knowledge_count);
                }
                None => log::info!("No snapshot found yet."),
            }

            let checkpoint = checkpoint_store.load().await?;
            if !checkpoint.is_empty() {
                log::info!(
                    "Unfinished crawl checkpoint: {} completed, {} failed",
                    checkpoint.completed.len(),
                    checkpoint.failed.len()
                );
            }
        }
    }

    Ok(())
}

/// Load a snapshot from an explicit file path.
fn load_snapshot_file(path: &PathBuf) -> Result<Snapshot> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}
