//! Pipeline stages for crawl, aggregation and change detection.
//!
//! - `crawl`: full run orchestration (list → dedupe → details → snapshot)
//! - `dedup`: first-seen deduplication of the raw catalog list
//! - `aggregate`: master grouping and profession id assignment
//! - `diff`: change classification between two snapshots
//! - `report`: Markdown rendering of a change set
//! - `validate`: data-quality assessment of a snapshot

pub mod aggregate;
pub mod crawl;
pub mod dedup;
pub mod diff;
pub mod report;
pub mod validate;

pub use aggregate::aggregate;
pub use crawl::run_crawl;
pub use dedup::dedupe_modules;
pub use diff::{ChangeSet, ChangedModule, diff};
pub use report::build_report;
pub use validate::{QualityFindings, assess, build_validation_report};
