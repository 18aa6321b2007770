// src/pipeline/aggregate.rs

//! Master module aggregation.
//!
//! Runs strictly single-threaded after the crawl pool has drained. Groups
//! extracted records by module number, sorts versions, assigns profession
//! ids and produces the deterministic master list: output order depends
//! only on module numbers and versions, never on worker completion order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{MasterModule, ModuleRecord, ModuleVersion, Profession};

/// Aggregate extracted records into master modules plus the profession
/// mapping of this run.
pub fn aggregate(records: Vec<ModuleRecord>) -> (Vec<MasterModule>, Vec<Profession>) {
    let professions = build_profession_mapping(&records);
    let id_by_name: HashMap<&str, u32> = professions
        .iter()
        .map(|p| (p.name.as_str(), p.id))
        .collect();

    // Group by module number; BTreeMap on the parsed number gives the
    // mandatory ascending output order.
    let mut groups: BTreeMap<u32, Vec<ModuleRecord>> = BTreeMap::new();
    for record in records {
        let number = record.module_number.parse().unwrap_or(0);
        groups.entry(number).or_default().push(record);
    }

    let mut masters = Vec::with_capacity(groups.len());
    for (_, mut group) in groups {
        group.sort_by_key(|r| r.numeric_version());

        let versions: Vec<ModuleVersion> = group
            .into_iter()
            .map(|record| resolve_professions(record, &id_by_name))
            .collect();

        // Groups are never created empty.
        let Some(highest) = versions.last() else {
            continue;
        };
        masters.push(MasterModule {
            master_id: format!("M{}", highest.module_number),
            module_number: highest.module_number.clone(),
            title: highest.title.clone(),
            version_count: versions.len(),
            versions,
        });
    }

    (masters, professions)
}

/// Distinct profession names across all records, sorted lexicographically
/// and numbered from 1. Ids are dense within one run; they are not stable
/// across runs unless the name set is unchanged.
fn build_profession_mapping(records: &[ModuleRecord]) -> Vec<Profession> {
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.professions.iter())
        .map(String::as_str)
        .collect();

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Profession {
            id: i as u32 + 1,
            name: name.to_string(),
        })
        .collect()
}

/// Replace raw profession names with ids. Unresolvable names indicate a
/// data inconsistency internal to this run and are silently dropped.
fn resolve_professions(record: ModuleRecord, id_by_name: &HashMap<&str, u32>) -> ModuleVersion {
    let profession_ids = record
        .professions
        .iter()
        .filter_map(|name| id_by_name.get(name.as_str()).copied())
        .collect();

    ModuleVersion {
        module_number: record.module_number,
        version: record.version,
        title: record.title,
        publication_date: record.publication_date,
        content_hash: record.content_hash,
        goals: record.goals,
        profession_ids,
        last_checked: record.last_checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(number: &str, version: &str, title: &str, professions: &[&str]) -> ModuleRecord {
        ModuleRecord {
            module_number: number.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            publication_date: Some("2021-02-01".to_string()),
            content_hash: Some("ab12cd34ef56ab12".to_string()),
            goals: vec![],
            professions: professions.iter().map(|p| p.to_string()).collect(),
            last_checked: "2026-08-30T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_groups_versions_under_one_master() {
        let records = vec![
            make_record("107", "1", "Alte Version", &[]),
            make_record("107", "2", "Neue Version", &[]),
        ];
        let (masters, _) = aggregate(records);
        assert_eq!(masters.len(), 1);

        let master = &masters[0];
        assert_eq!(master.master_id, "M107");
        assert_eq!(master.module_number, "107");
        assert_eq!(master.version_count, 2);
        // Master title comes from the highest version.
        assert_eq!(master.title, "Neue Version");
        assert_eq!(master.versions[0].version, "1");
        assert_eq!(master.versions[1].version, "2");
    }

    #[test]
    fn test_versions_sorted_numerically_not_lexically() {
        let records = vec![
            make_record("293", "10", "Version zehn", &[]),
            make_record("293", "2", "Version zwei", &[]),
        ];
        let (masters, _) = aggregate(records);
        let versions: Vec<&str> = masters[0].versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(versions, vec!["2", "10"]);
        assert_eq!(masters[0].title, "Version zehn");
    }

    #[test]
    fn test_masters_sorted_by_numeric_module_number() {
        let records = vec![
            make_record("1234", "1", "d", &[]),
            make_record("293", "1", "c", &[]),
            make_record("107", "1", "a", &[]),
        ];
        let (masters, _) = aggregate(records);
        let numbers: Vec<&str> = masters.iter().map(|m| m.module_number.as_str()).collect();
        assert_eq!(numbers, vec!["107", "293", "1234"]);
    }

    #[test]
    fn test_output_independent_of_completion_order() {
        let records = vec![
            make_record("107", "2", "b", &["Informatiker/in EFZ"]),
            make_record("431", "1", "c", &["ICT-Fachmann/-frau EFZ"]),
            make_record("107", "1", "a", &["Informatiker/in EFZ"]),
        ];

        let mut shuffled = records.clone();
        shuffled.reverse();
        shuffled.swap(0, 1);

        let result_a = aggregate(records);
        let result_b = aggregate(shuffled);
        assert_eq!(result_a, result_b);

        let json_a = serde_json::to_string(&result_a.0).unwrap();
        let json_b = serde_json::to_string(&result_b.0).unwrap();
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn test_profession_ids_lexicographic_and_dense() {
        let records = vec![
            make_record("107", "1", "a", &["Informatiker EFZ", "ICT-Fachmann EFZ"]),
            make_record("108", "1", "b", &["Informatiker EFZ"]),
        ];
        let (masters, professions) = aggregate(records);

        assert_eq!(
            professions,
            vec![
                Profession {
                    id: 1,
                    name: "ICT-Fachmann EFZ".to_string()
                },
                Profession {
                    id: 2,
                    name: "Informatiker EFZ".to_string()
                },
            ]
        );

        // Name lists are replaced by id lists, in the record's order.
        assert_eq!(masters[0].versions[0].profession_ids, vec![2, 1]);
        assert_eq!(masters[1].versions[0].profession_ids, vec![2]);
    }

    #[test]
    fn test_profession_names_globally_unique() {
        let records = vec![
            make_record("107", "1", "a", &["Informatiker EFZ"]),
            make_record("108", "1", "b", &["Informatiker EFZ"]),
            make_record("109", "1", "c", &["Informatiker EFZ"]),
        ];
        let (_, professions) = aggregate(records);
        assert_eq!(professions.len(), 1);
        assert_eq!(professions[0].id, 1);
    }

    #[test]
    fn test_unresolvable_profession_dropped_silently() {
        let record = make_record("107", "1", "a", &["Informatiker EFZ"]);
        let id_by_name: HashMap<&str, u32> = HashMap::new();
        let version = resolve_professions(record, &id_by_name);
        assert!(version.profession_ids.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let (masters, professions) = aggregate(vec![]);
        assert!(masters.is_empty());
        assert!(professions.is_empty());
    }

    #[test]
    fn test_dedup_then_aggregate_scenario() {
        // Raw list [{107,1},{107,1},{107,2}] ends up as one master with
        // two versions.
        use crate::models::ModuleRef;
        use crate::pipeline::dedup::dedupe_modules;

        let raw = vec![
            ModuleRef {
                module_number: "107".to_string(),
                version: "1".to_string(),
                title: "t".to_string(),
                detail_url: String::new(),
            },
            ModuleRef {
                module_number: "107".to_string(),
                version: "1".to_string(),
                title: "t".to_string(),
                detail_url: String::new(),
            },
            ModuleRef {
                module_number: "107".to_string(),
                version: "2".to_string(),
                title: "t".to_string(),
                detail_url: String::new(),
            },
        ];
        let unique = dedupe_modules(raw);
        assert_eq!(unique.len(), 2);

        let records: Vec<ModuleRecord> = unique
            .iter()
            .map(|m| make_record(&m.module_number, &m.version, &m.title, &[]))
            .collect();
        let (masters, _) = aggregate(records);
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0].master_id, "M107");
        assert_eq!(masters[0].version_count, 2);
    }
}
