// src/pipeline/report.rs

//! Markdown report over a [`ChangeSet`].
//!
//! Pure formatter: no classification logic lives here. Section order is
//! fixed (summary, statistics table, new modules, changed modules,
//! removed modules, new professions) and empty categories are omitted.

use crate::pipeline::diff::ChangeSet;

const TITLE_WIDTH: usize = 40;

/// Render the update report comparing `old_label` and `new_label`.
pub fn build_report(changes: &ChangeSet, old_label: &str, new_label: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Module Database Update Report".to_string());
    lines.push(String::new());
    lines.push(format!("**Update date:** {}", new_label));
    lines.push(format!("**Previous version:** {}", old_label));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    summary_section(&mut lines, changes);
    statistics_section(&mut lines, changes);

    if !changes.added.is_empty() {
        lines.push("## New Modules".to_string());
        lines.push(String::new());
        for key in &changes.added {
            lines.push(format!("- `{}`", key));
        }
        lines.push(String::new());
    }

    if !changes.changed.is_empty() {
        lines.push("## Changed Modules (new publication date)".to_string());
        lines.push(String::new());
        lines.push("| Module | Title | Old date | New date |".to_string());
        lines.push("|--------|-------|----------|----------|".to_string());
        for change in &changes.changed {
            lines.push(format!(
                "| `{}` | {} | {} | {} |",
                change.key,
                truncate(&change.title, TITLE_WIDTH),
                change.old_date.as_deref().unwrap_or("n/a"),
                change.new_date.as_deref().unwrap_or("n/a"),
            ));
        }
        lines.push(String::new());
    }

    if !changes.removed.is_empty() {
        lines.push("## Removed Modules".to_string());
        lines.push(String::new());
        for key in &changes.removed {
            lines.push(format!("- `{}`", key));
        }
        lines.push(String::new());
    }

    if !changes.new_professions.is_empty() {
        lines.push("## New Professions".to_string());
        lines.push(String::new());
        for name in &changes.new_professions {
            lines.push(format!("- {}", name));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn summary_section(lines: &mut Vec<String>, changes: &ChangeSet) {
    lines.push("## Summary".to_string());
    lines.push(String::new());

    if !changes.has_changes() {
        lines.push("**No changes** - database is up to date".to_string());
    } else {
        lines.push(format!("**{} changes** detected:", changes.change_count()));
        lines.push(String::new());
        lines.push(format!("- New modules: {}", changes.added.len()));
        lines.push(format!("- Changed modules: {}", changes.changed.len()));
        lines.push(format!("- Removed modules: {}", changes.removed.len()));
        lines.push(format!(
            "- New professions: {}",
            changes.new_professions.len()
        ));
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
}

fn statistics_section(lines: &mut Vec<String>, changes: &ChangeSet) {
    lines.push("## Statistics".to_string());
    lines.push(String::new());
    lines.push("| Metric | Before | After | Delta |".to_string());
    lines.push("|--------|--------|-------|-------|".to_string());

    let rows = [
        (
            "Master modules",
            changes.stats_old.master_modules,
            changes.stats_new.master_modules,
        ),
        ("Versions", changes.stats_old.versions, changes.stats_new.versions),
        (
            "Professions",
            changes.stats_old.professions,
            changes.stats_new.professions,
        ),
        ("Goals", changes.stats_old.goals, changes.stats_new.goals),
        (
            "Knowledge items",
            changes.stats_old.knowledge_items,
            changes.stats_new.knowledge_items,
        ),
    ];

    for (metric, before, after) in rows {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            metric,
            before,
            after,
            signed_delta(before, after)
        ));
    }
    lines.push(String::new());
}

fn signed_delta(before: usize, after: usize) -> String {
    let delta = after as i64 - before as i64;
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotStats;
    use crate::pipeline::diff::ChangedModule;

    fn stats(versions: usize) -> SnapshotStats {
        SnapshotStats {
            master_modules: versions,
            versions,
            professions: 2,
            goals: 0,
            knowledge_items: 0,
        }
    }

    #[test]
    fn test_no_changes_report() {
        let changes = ChangeSet {
            stats_old: stats(3),
            stats_new: stats(3),
            unchanged: 3,
            ..ChangeSet::default()
        };
        let report = build_report(&changes, "2026-08-01", "2026-08-30");

        assert!(report.contains("**No changes** - database is up to date"));
        assert!(report.contains("**Update date:** 2026-08-30"));
        assert!(report.contains("**Previous version:** 2026-08-01"));
        // Empty categories are omitted entirely.
        assert!(!report.contains("## New Modules"));
        assert!(!report.contains("## Removed Modules"));
    }

    #[test]
    fn test_full_report_sections_in_order() {
        let changes = ChangeSet {
            added: vec!["108-V1".to_string()],
            removed: vec!["109-V1".to_string()],
            changed: vec![ChangedModule {
                key: "107-V1".to_string(),
                title: "Datenbanken abfragen".to_string(),
                old_date: Some("2021-02-01".to_string()),
                new_date: Some("2023-05-17".to_string()),
            }],
            new_professions: vec!["ICT-Fachmann EFZ".to_string()],
            unchanged: 0,
            stats_old: stats(2),
            stats_new: stats(2),
        };
        let report = build_report(&changes, "2026-08-01", "2026-08-30");

        assert!(report.contains("**3 changes** detected:"));

        let order = [
            "## Summary",
            "## Statistics",
            "## New Modules",
            "## Changed Modules",
            "## Removed Modules",
            "## New Professions",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|section| report.find(section).unwrap_or_else(|| panic!("missing {section}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(report.contains("| `107-V1` | Datenbanken abfragen | 2021-02-01 | 2023-05-17 |"));
        assert!(report.contains("- `108-V1`"));
        assert!(report.contains("- `109-V1`"));
        assert!(report.contains("- ICT-Fachmann EFZ"));
    }

    #[test]
    fn test_statistics_deltas_signed() {
        let changes = ChangeSet {
            stats_old: stats(5),
            stats_new: stats(3),
            ..ChangeSet::default()
        };
        let report = build_report(&changes, "a", "b");
        assert!(report.contains("| Versions | 5 | 3 | -2 |"));

        let changes = ChangeSet {
            stats_old: stats(3),
            stats_new: stats(5),
            ..ChangeSet::default()
        };
        let report = build_report(&changes, "a", "b");
        assert!(report.contains("| Versions | 3 | 5 | +2 |"));
        assert!(report.contains("| Professions | 2 | 2 | 0 |"));
    }

    #[test]
    fn test_missing_dates_render_as_na() {
        let changes = ChangeSet {
            changed: vec![ChangedModule {
                key: "107-V1".to_string(),
                title: "t".to_string(),
                old_date: None,
                new_date: Some("2023-05-17".to_string()),
            }],
            stats_old: stats(1),
            stats_new: stats(1),
            ..ChangeSet::default()
        };
        let report = build_report(&changes, "a", "b");
        assert!(report.contains("| `107-V1` | t | n/a | 2023-05-17 |"));
    }

    #[test]
    fn test_long_titles_truncated() {
        let changes = ChangeSet {
            changed: vec![ChangedModule {
                key: "107-V1".to_string(),
                title: "x".repeat(60),
                old_date: None,
                new_date: None,
            }],
            stats_old: stats(1),
            stats_new: stats(1),
            ..ChangeSet::default()
        };
        let report = build_report(&changes, "a", "b");
        assert!(report.contains(&"x".repeat(40)));
        assert!(!report.contains(&"x".repeat(41)));
    }
}
