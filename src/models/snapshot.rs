//! Snapshot data structures.
//!
//! A snapshot is one immutable, complete capture of the aggregated dataset.
//! Field names and nesting are kept stable across runs so snapshots remain
//! diffable by key.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{MasterModule, Profession};

/// Persisted dataset at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub meta: SnapshotMeta,

    #[serde(rename = "berufe")]
    pub professions: Vec<Profession>,

    #[serde(rename = "module")]
    pub masters: Vec<MasterModule>,
}

/// Snapshot header with creation timestamp and summary counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Source catalog URL
    #[serde(rename = "quelle")]
    pub source: String,

    /// ISO creation timestamp
    #[serde(rename = "erstellt")]
    pub created_at: String,

    #[serde(rename = "anzahl_master_module")]
    pub master_count: usize,

    #[serde(rename = "anzahl_versionen_total")]
    pub version_count: usize,

    #[serde(rename = "anzahl_berufe")]
    pub profession_count: usize,

    #[serde(rename = "anzahl_handlungsziele_total")]
    pub goal_count: usize,

    #[serde(rename = "anzahl_kenntnisse_total")]
    pub knowledge_count: usize,
}

impl Snapshot {
    /// Assemble a snapshot from aggregated masters and professions,
    /// stamping the current time.
    pub fn new(source: &str, masters: Vec<MasterModule>, professions: Vec<Profession>) -> Self {
        let stats = count_tree(&masters);
        Self {
            meta: SnapshotMeta {
                source: source.to_string(),
                created_at: Utc::now().to_rfc3339(),
                master_count: masters.len(),
                version_count: stats.versions,
                profession_count: professions.len(),
                goal_count: stats.goals,
                knowledge_count: stats.knowledge_items,
            },
            professions,
            masters,
        }
    }

    /// Derived statistics, recomputed from the module tree rather than
    /// trusted from `meta`.
    pub fn stats(&self) -> SnapshotStats {
        let mut stats = count_tree(&self.masters);
        stats.professions = self.professions.len();
        stats
    }

    /// Date part (`YYYY-MM-DD`) of the creation timestamp, used to label
    /// backups and reports. Snapshots can come from user-supplied files,
    /// so a malformed timestamp falls back to the full value instead of
    /// slicing into a char.
    pub fn created_date(&self) -> &str {
        let created = &self.meta.created_at;
        created.get(..10).unwrap_or(created)
    }
}

/// Aggregate counts over one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub master_modules: usize,
    pub versions: usize,
    pub professions: usize,
    pub goals: usize,
    pub knowledge_items: usize,
}

fn count_tree(masters: &[MasterModule]) -> SnapshotStats {
    let mut stats = SnapshotStats {
        master_modules: masters.len(),
        ..SnapshotStats::default()
    };
    for master in masters {
        stats.versions += master.versions.len();
        for version in &master.versions {
            stats.goals += version.goals.len();
            for goal in &version.goals {
                if let Some(items) = &goal.knowledge_items {
                    stats.knowledge_items += items.len();
                }
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, ModuleVersion};

    fn make_master(number: &str, versions: Vec<ModuleVersion>) -> MasterModule {
        MasterModule {
            master_id: format!("M{}", number),
            module_number: number.to_string(),
            title: "Testmodul".to_string(),
            version_count: versions.len(),
            versions,
        }
    }

    fn make_version(number: &str, version: &str, goals: Vec<Goal>) -> ModuleVersion {
        ModuleVersion {
            module_number: number.to_string(),
            version: version.to_string(),
            title: "Testmodul".to_string(),
            publication_date: Some("2021-02-01".to_string()),
            content_hash: Some("aaaa".to_string()),
            goals,
            profession_ids: vec![1],
            last_checked: "2026-08-30T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_stats_counts_tree() {
        let goals = vec![
            Goal {
                number: "1".to_string(),
                description: "A".to_string(),
                knowledge_items: Some(vec!["1. Kennt X.".to_string(), "2. Kennt Y.".to_string()]),
            },
            Goal {
                number: "2".to_string(),
                description: "B".to_string(),
                knowledge_items: None,
            },
        ];
        let masters = vec![
            make_master(
                "107",
                vec![make_version("107", "1", goals), make_version("107", "2", vec![])],
            ),
            make_master("108", vec![make_version("108", "1", vec![])]),
        ];
        let snapshot = Snapshot::new(
            "https://www.modulbaukasten.ch",
            masters,
            vec![Profession {
                id: 1,
                name: "Informatiker EFZ".to_string(),
            }],
        );

        let stats = snapshot.stats();
        assert_eq!(stats.master_modules, 2);
        assert_eq!(stats.versions, 3);
        assert_eq!(stats.professions, 1);
        assert_eq!(stats.goals, 2);
        assert_eq!(stats.knowledge_items, 2);

        // Meta mirrors the derived counts at creation time.
        assert_eq!(snapshot.meta.master_count, 2);
        assert_eq!(snapshot.meta.version_count, 3);
        assert_eq!(snapshot.meta.goal_count, 2);
        assert_eq!(snapshot.meta.knowledge_count, 2);
    }

    #[test]
    fn test_top_level_field_names() {
        let snapshot = Snapshot::new("https://www.modulbaukasten.ch", vec![], vec![]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("meta").is_some());
        assert!(json.get("berufe").is_some());
        assert!(json.get("module").is_some());
        assert!(json["meta"].get("quelle").is_some());
        assert!(json["meta"].get("erstellt").is_some());
    }

    #[test]
    fn test_created_date_prefix() {
        let mut snapshot = Snapshot::new("src", vec![], vec![]);
        snapshot.meta.created_at = "2026-08-30T10:11:12+00:00".to_string();
        assert_eq!(snapshot.created_date(), "2026-08-30");
    }

    #[test]
    fn test_created_date_tolerates_short_and_multibyte_values() {
        let mut snapshot = Snapshot::new("src", vec![], vec![]);

        snapshot.meta.created_at = "gestern".to_string();
        assert_eq!(snapshot.created_date(), "gestern");

        // Byte 10 falls inside the two-byte character.
        snapshot.meta.created_at = "2026-08-3ü12:00".to_string();
        assert_eq!(snapshot.created_date(), "2026-08-3ü12:00");
    }
}
