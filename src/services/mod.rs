//! Crawling services.
//!
//! - `fetcher`: page retrieval behind the [`Fetcher`] trait, with retry
//! - `extractor`: structural extraction from rendered pages
//! - `crawler`: the bounded-concurrency detail crawl with checkpointing

pub mod crawler;
pub mod extractor;
pub mod fetcher;

pub use crawler::{CrawlOutcome, ModuleCrawler};
pub use extractor::{ModuleDetail, extract_module_detail, extract_module_list};
pub use fetcher::{Fetcher, HttpFetcher, RetryPolicy, fetch_with_retry};
