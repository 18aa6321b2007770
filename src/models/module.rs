//! Module data structures.
//!
//! A catalog *master module* groups every published version sharing one
//! module number. Versions carry action goals (Handlungsziele), optional
//! per-goal knowledge items and the professions the module applies to.

use serde::{Deserialize, Serialize};

/// One entry of the rendered catalog list page.
///
/// `module_number` and `version` are kept as the numeric strings shown by
/// the source ("107", "1") so snapshot output matches the catalog verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleRef {
    /// Module number (3-4 digits)
    pub module_number: String,

    /// Version number within the module
    pub version: String,

    /// Module title as listed
    pub title: String,

    /// Absolute URL of the detail page
    pub detail_url: String,
}

impl ModuleRef {
    /// Identity key of this version, unique within one catalog snapshot.
    pub fn key(&self) -> String {
        version_key(&self.module_number, &self.version)
    }
}

/// Build the canonical `"{number}-V{version}"` identity key.
pub fn version_key(module_number: &str, version: &str) -> String {
    format!("{}-V{}", module_number, version)
}

/// One action goal (Handlungsziel) of a module version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    /// Goal number within the version
    #[serde(rename = "nummer")]
    pub number: String,

    /// Goal description text
    #[serde(rename = "beschreibung")]
    pub description: String,

    /// Required knowledge items. `None` when the goal section contained no
    /// parseable knowledge entries; the absence is preserved in output.
    #[serde(
        rename = "handlungsnotwendige_kenntnisse",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub knowledge_items: Option<Vec<String>>,
}

/// A fully extracted module version as assembled during one crawl run.
///
/// Professions are still raw names here; the aggregation stage replaces
/// them with ids when the snapshot is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleRecord {
    pub module_number: String,
    pub version: String,
    pub title: String,

    /// Publication date in ISO form (`YYYY-MM-DD`), absent when the detail
    /// page carried no matchable date
    pub publication_date: Option<String>,

    /// Content hash over the publication date, absent together with it
    pub content_hash: Option<String>,

    pub goals: Vec<Goal>,

    /// Raw profession names in first-seen order
    pub professions: Vec<String>,

    /// ISO timestamp of the detail fetch
    pub last_checked: String,
}

impl ModuleRecord {
    /// Identity key of this version.
    pub fn key(&self) -> String {
        version_key(&self.module_number, &self.version)
    }

    /// Version number parsed for ordering. Unparseable versions sort first.
    pub fn numeric_version(&self) -> u32 {
        self.version.parse().unwrap_or(0)
    }
}

/// Snapshot form of a module version, professions resolved to ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleVersion {
    #[serde(rename = "nummer")]
    pub module_number: String,

    pub version: String,

    #[serde(rename = "titel")]
    pub title: String,

    #[serde(
        rename = "publikationsdatum",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub publication_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content_hash: Option<String>,

    #[serde(rename = "handlungsziele")]
    pub goals: Vec<Goal>,

    #[serde(rename = "berufe_ids")]
    pub profession_ids: Vec<u32>,

    #[serde(rename = "letzter_check")]
    pub last_checked: String,
}

impl ModuleVersion {
    /// Identity key of this version.
    pub fn key(&self) -> String {
        version_key(&self.module_number, &self.version)
    }

    /// Version number parsed for ordering.
    pub fn numeric_version(&self) -> u32 {
        self.version.parse().unwrap_or(0)
    }
}

/// A named occupational qualification.
///
/// Ids are assigned per crawl run by sorting the distinct names
/// lexicographically and numbering from 1. They are dense within one run
/// but not guaranteed stable across runs; cross-snapshot comparison must
/// key on `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profession {
    pub id: u32,
    pub name: String,
}

/// A master module grouping all versions sharing one module number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterModule {
    /// `"M" + module_number`
    pub master_id: String,

    #[serde(rename = "nummer")]
    pub module_number: String,

    /// Title of the highest version
    #[serde(rename = "titel_master")]
    pub title: String,

    #[serde(rename = "anzahl_versionen")]
    pub version_count: usize,

    /// Versions ascending by numeric version
    #[serde(rename = "versionen")]
    pub versions: Vec<ModuleVersion>,
}

impl MasterModule {
    /// Module number parsed for ordering.
    pub fn numeric_number(&self) -> u32 {
        self.module_number.parse().unwrap_or(0)
    }
}
