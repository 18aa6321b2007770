// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod module;
mod snapshot;

// Re-export all public types
pub use config::{Config, CrawlerConfig, PathsConfig};
pub use module::{
    Goal, MasterModule, ModuleRecord, ModuleRef, ModuleVersion, Profession, version_key,
};
pub use snapshot::{Snapshot, SnapshotMeta, SnapshotStats};
