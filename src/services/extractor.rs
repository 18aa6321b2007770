// src/services/extractor.rs

//! Structural extraction of module data from rendered catalog pages.
//!
//! The list page exposes one `app-module-grid-item` per catalog entry; the
//! detail page carries the publication date in a `.publish` element, the
//! action goals as `mat-expansion-panel` sections and the professions as
//! `mat-chip` elements. Absence of any field is a valid state, never an
//! error: unrenderable dates simply leave the record without a content
//! hash, and goal sections without numbered "Kennt ..." sentences yield
//! goals without knowledge items.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{Goal, ModuleRef};

/// Detail-page fields; all optional or possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDetail {
    pub publication_date: Option<String>,
    pub content_hash: Option<String>,
    pub goals: Vec<Goal>,
    pub professions: Vec<String>,
}

/// Catalog detail links look like `/module/107/1/de-DE`.
static DETAIL_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/module/(\d+)/(\d+)/").expect("valid regex"));

/// Grid item text looks like `107V1Datenbanken abfragen`.
static LIST_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3,4})V(\d+)(.*)").expect("valid regex"));

/// Swiss date form `DD.MM.YYYY` inside the publish block.
static PUBLISH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})").expect("valid regex"));

/// Goal headers are numbered: `1. Beschreibung ...`.
static GOAL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)").expect("valid regex"));

/// Knowledge items are numbered sentences starting with the fixed lexical
/// marker "Kennt", optionally with one trailing parenthesis group.
static KNOWLEDGE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\s*Kennt[^.]+(?:\([^)]+\))?\.(?:\s*\([^)]+\))?").expect("valid regex")
});

/// Truncated SHA-256 over the publication date, the comparable content of a
/// version. `None` in, `None` out.
pub fn content_hash(publication_date: Option<&str>) -> Option<String> {
    let date = publication_date?;
    let digest = Sha256::digest(date.as_bytes());
    Some(hex::encode(digest)[..16].to_string())
}

/// Extract all module references from the rendered list page.
///
/// Entries whose link or text does not match the expected shape are
/// skipped; the source lists some modules twice, so the result may contain
/// exact duplicates and must be deduplicated before detail retrieval.
pub fn extract_module_list(html: &str, base_url: &str) -> Result<Vec<ModuleRef>> {
    let document = Html::parse_document(html);
    let item_sel = parse_selector("app-module-grid-item")?;
    let link_sel = parse_selector("a")?;
    let base = url::Url::parse(base_url)?;

    let mut modules = Vec::new();
    for item in document.select(&item_sel) {
        let Some(link) = item.select(&link_sel).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or("");
        if !DETAIL_HREF.is_match(href) {
            continue;
        }

        let text: String = item.text().collect::<String>().trim().to_string();
        let Some(caps) = LIST_TITLE.captures(&text) else {
            continue;
        };

        let detail_url = base.join(href)?;
        modules.push(ModuleRef {
            module_number: caps[1].to_string(),
            version: caps[2].to_string(),
            title: caps[3].trim().to_string(),
            detail_url: detail_url.to_string(),
        });
    }
    Ok(modules)
}

/// Extract the detail-page fields of one module version.
pub fn extract_module_detail(html: &str) -> Result<ModuleDetail> {
    let document = Html::parse_document(html);

    let publication_date = extract_publication_date(&document)?;
    let goals = extract_goals(&document)?;
    let professions = extract_professions(&document)?;

    Ok(ModuleDetail {
        content_hash: content_hash(publication_date.as_deref()),
        publication_date,
        goals,
        professions,
    })
}

/// Publication date from the `.publish` block, normalised to `YYYY-MM-DD`.
fn extract_publication_date(document: &Html) -> Result<Option<String>> {
    let publish_sel = parse_selector(".publish")?;
    let Some(publish) = document.select(&publish_sel).next() else {
        return Ok(None);
    };

    let text: String = publish.text().collect();
    let Some(caps) = PUBLISH_DATE.captures(&text) else {
        return Ok(None);
    };
    Ok(Some(format!("{}-{}-{}", &caps[3], &caps[2], &caps[1])))
}

/// Goals from the expansion panels. A panel header that is not a numbered
/// goal (navigation chrome renders the same element) is skipped.
fn extract_goals(document: &Html) -> Result<Vec<Goal>> {
    let panel_sel = parse_selector("mat-expansion-panel")?;
    let header_sel = parse_selector("mat-expansion-panel-header")?;
    let content_sel = parse_selector(".mat-expansion-panel-content")?;

    let mut goals = Vec::new();
    for panel in document.select(&panel_sel) {
        let Some(header) = panel.select(&header_sel).next() else {
            continue;
        };
        let header_text: String = header.text().collect::<String>().trim().to_string();
        let Some(caps) = GOAL_HEADER.captures(&header_text) else {
            continue;
        };

        let knowledge_items = panel
            .select(&content_sel)
            .next()
            .map(|content| {
                let content_text: String = content.text().collect();
                KNOWLEDGE_ITEM
                    .find_iter(&content_text)
                    .map(|m| m.as_str().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty());

        goals.push(Goal {
            number: caps[1].to_string(),
            description: caps[2].trim().to_string(),
            knowledge_items,
        });
    }
    Ok(goals)
}

/// Profession names from the chips, first-seen order, duplicates skipped.
fn extract_professions(document: &Html) -> Result<Vec<String>> {
    let chip_sel = parse_selector("mat-chip")?;

    let mut professions: Vec<String> = Vec::new();
    for chip in document.select(&chip_sel) {
        let text: String = chip.text().collect::<String>().trim().to_string();
        if !text.is_empty() && !professions.iter().any(|p| p == &text) {
            professions.push(text);
        }
    }
    Ok(professions)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
