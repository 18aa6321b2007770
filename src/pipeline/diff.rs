// src/pipeline/diff.rs

//! Change detection between two snapshots.
//!
//! Every module version is classified as added, removed, changed or
//! unchanged by comparing content hashes under the `"{number}-V{version}"`
//! identity key. Professions are compared by name, never by id: ids are
//! reassigned per run and carry no meaning across snapshots.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{ModuleVersion, Snapshot, SnapshotStats, version_key};

/// One changed module version with the publication dates before and after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangedModule {
    pub key: String,
    pub title: String,
    pub old_date: Option<String>,
    pub new_date: Option<String>,
}

/// Classified difference between two snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeSet {
    /// Keys present only in the new snapshot
    pub added: Vec<String>,

    /// Keys present only in the old snapshot
    pub removed: Vec<String>,

    /// Keys present in both with differing content hash
    pub changed: Vec<ChangedModule>,

    /// Profession names present only in the new snapshot. Removals are
    /// deliberately not reported.
    pub new_professions: Vec<String>,

    /// Count of keys present in both with equal hash, not itemized
    pub unchanged: usize,

    pub stats_old: SnapshotStats,
    pub stats_new: SnapshotStats,
}

impl ChangeSet {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.changed.is_empty()
    }

    /// Total number of module-level changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Keyed view of a version together with its master title.
struct VersionEntry<'a> {
    version: &'a ModuleVersion,
    master_title: &'a str,
}

fn index_versions(snapshot: &Snapshot) -> HashMap<String, VersionEntry<'_>> {
    let mut map = HashMap::new();
    for master in &snapshot.masters {
        for version in &master.versions {
            map.insert(
                version_key(&master.module_number, &version.version),
                VersionEntry {
                    version,
                    master_title: &master.title,
                },
            );
        }
    }
    map
}

/// Compare two snapshots and classify every module version.
pub fn diff(old: &Snapshot, new: &Snapshot) -> ChangeSet {
    let old_map = index_versions(old);
    let new_map = index_versions(new);

    let mut changes = ChangeSet {
        stats_old: old.stats(),
        stats_new: new.stats(),
        ..ChangeSet::default()
    };

    for (key, entry) in &new_map {
        match old_map.get(key) {
            None => changes.added.push(key.clone()),
            Some(old_entry) => {
                // Null-vs-non-null counts as a change too.
                if old_entry.version.content_hash != entry.version.content_hash {
                    changes.changed.push(ChangedModule {
                        key: key.clone(),
                        title: entry.master_title.to_string(),
                        old_date: old_entry.version.publication_date.clone(),
                        new_date: entry.version.publication_date.clone(),
                    });
                } else {
                    changes.unchanged += 1;
                }
            }
        }
    }

    for key in old_map.keys() {
        if !new_map.contains_key(key) {
            changes.removed.push(key.clone());
        }
    }

    // Professions by name; ids are run-local.
    let old_names: BTreeSet<&str> = old.professions.iter().map(|p| p.name.as_str()).collect();
    changes.new_professions = new
        .professions
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| !old_names.contains(name))
        .map(str::to_string)
        .collect();
    changes.new_professions.sort();

    // Deterministic report order regardless of map iteration.
    changes.added.sort();
    changes.removed.sort();
    changes.changed.sort_by(|a, b| a.key.cmp(&b.key));

    changes
}
