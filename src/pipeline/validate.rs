// src/pipeline/validate.rs

//! Data-quality assessment over a [`Snapshot`].
//!
//! Walks the module tree and collects the versions with missing pieces:
//! no professions, no publication date, no goals, or goals without any
//! knowledge items. Meta counts are checked against the recomputed tree
//! counts. The rendered report mirrors the update report's shape and is
//! meant for a human judging a fresh crawl.

use crate::models::{Snapshot, SnapshotStats, version_key};

const EXAMPLE_LIMIT: usize = 10;

/// Keys of incomplete versions per category, plus the derived counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityFindings {
    /// Versions without any profession ids
    pub without_professions: Vec<String>,

    /// Versions without a publication date (and therefore without hash)
    pub without_publication_date: Vec<String>,

    /// Versions without any goals
    pub without_goals: Vec<String>,

    /// Versions with goals but no knowledge items on any of them
    pub without_knowledge: Vec<String>,

    /// Mismatches between `meta` and the recomputed tree counts
    pub meta_mismatches: Vec<String>,

    /// Versions passing every check
    pub complete_versions: usize,

    pub total_versions: usize,
    pub stats: SnapshotStats,
}

impl QualityFindings {
    /// Share of versions with all data, in percent.
    pub fn completeness_percent(&self) -> f64 {
        if self.total_versions == 0 {
            100.0
        } else {
            self.complete_versions as f64 * 100.0 / self.total_versions as f64
        }
    }

    /// Check if every version is complete and the meta is consistent.
    pub fn is_clean(&self) -> bool {
        self.complete_versions == self.total_versions && self.meta_mismatches.is_empty()
    }
}

/// Assess the data quality of a snapshot.
pub fn assess(snapshot: &Snapshot) -> QualityFindings {
    let mut findings = QualityFindings {
        stats: snapshot.stats(),
        ..QualityFindings::default()
    };

    for master in &snapshot.masters {
        for version in &master.versions {
            let key = version_key(&master.module_number, &version.version);
            findings.total_versions += 1;
            let mut complete = true;

            if version.profession_ids.is_empty() {
                findings.without_professions.push(key.clone());
                complete = false;
            }
            if version.publication_date.is_none() {
                findings.without_publication_date.push(key.clone());
                complete = false;
            }
            if version.goals.is_empty() {
                findings.without_goals.push(key.clone());
                complete = false;
            } else if version
                .goals
                .iter()
                .all(|g| g.knowledge_items.as_deref().unwrap_or(&[]).is_empty())
            {
                findings.without_knowledge.push(key.clone());
                complete = false;
            }

            if complete {
                findings.complete_versions += 1;
            }
        }
    }

    check_meta(snapshot, &findings.stats, &mut findings.meta_mismatches);
    findings
}

/// Compare recorded meta counts against the tree. Snapshots can come from
/// user-supplied files, so the meta is evidence, not truth.
fn check_meta(snapshot: &Snapshot, stats: &SnapshotStats, out: &mut Vec<String>) {
    let meta = &snapshot.meta;
    let checks = [
        ("anzahl_master_module", meta.master_count, stats.master_modules),
        ("anzahl_versionen_total", meta.version_count, stats.versions),
        ("anzahl_berufe", meta.profession_count, stats.professions),
        ("anzahl_handlungsziele_total", meta.goal_count, stats.goals),
        (
            "anzahl_kenntnisse_total",
            meta.knowledge_count,
            stats.knowledge_items,
        ),
    ];
    for (field, recorded, actual) in checks {
        if recorded != actual {
            out.push(format!("{}: meta says {}, tree has {}", field, recorded, actual));
        }
    }
}

/// Render the validation report for a snapshot.
pub fn build_validation_report(snapshot: &Snapshot, findings: &QualityFindings) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Data Validation Report".to_string());
    lines.push(String::new());
    lines.push(format!("**Snapshot created:** {}", snapshot.meta.created_at));
    lines.push(format!("**Source:** {}", snapshot.meta.source));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("## Statistics".to_string());
    lines.push(String::new());
    lines.push(format!("- Master modules: {}", findings.stats.master_modules));
    lines.push(format!("- Versions: {}", findings.stats.versions));
    lines.push(format!("- Professions: {}", findings.stats.professions));
    lines.push(format!("- Goals: {}", findings.stats.goals));
    lines.push(format!("- Knowledge items: {}", findings.stats.knowledge_items));
    lines.push(String::new());

    if !findings.meta_mismatches.is_empty() {
        lines.push("## Meta Inconsistencies".to_string());
        lines.push(String::new());
        for mismatch in &findings.meta_mismatches {
            lines.push(format!("- {}", mismatch));
        }
        lines.push(String::new());
    }

    lines.push("## Missing Data".to_string());
    lines.push(String::new());
    category(&mut lines, "Versions without professions", &findings.without_professions);
    category(
        &mut lines,
        "Versions without publication date",
        &findings.without_publication_date,
    );
    category(&mut lines, "Versions without goals", &findings.without_goals);
    category(
        &mut lines,
        "Versions without knowledge items",
        &findings.without_knowledge,
    );
    lines.push(String::new());

    lines.push("## Quality".to_string());
    lines.push(String::new());
    lines.push(format!(
        "**Completeness: {:.1}%** ({} of {} versions with all data)",
        findings.completeness_percent(),
        findings.complete_versions,
        findings.total_versions
    ));

    lines.join("\n")
}

fn category(lines: &mut Vec<String>, label: &str, keys: &[String]) {
    lines.push(format!("- {}: {}", label, keys.len()));
    if !keys.is_empty() {
        let shown: Vec<&str> = keys
            .iter()
            .take(EXAMPLE_LIMIT)
            .map(String::as_str)
            .collect();
        lines.push(format!("  - e.g. `{}`", shown.join("`, `")));
    }
}
