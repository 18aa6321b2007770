// src/pipeline/dedup.rs

//! Deduplication of the raw catalog list.
//!
//! The source catalog lists some entries twice. Deduplication runs on the
//! list stage, before any detail page is fetched, so duplicate network
//! work never happens and the result is independent of crawl concurrency:
//! the first-seen entry per `(module_number, version)` key wins.

use std::collections::HashSet;

use crate::models::ModuleRef;

/// Collapse exact-key duplicates, keeping the first-seen entry per key and
/// preserving input order otherwise.
pub fn dedupe_modules(modules: Vec<ModuleRef>) -> Vec<ModuleRef> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(modules.len());
    for module in modules {
        if seen.insert(module.key()) {
            unique.push(module);
        }
    }
    unique
}
