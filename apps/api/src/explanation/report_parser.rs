#![allow(dead_code)]

//! Narrative report parser — pulls per-candidate analysis blocks out of the
//! free-form report the upstream model writes for a recommendation batch.
//!
//! Report shape (standard dialect):
//!
//! ```text
//! ## Per-candidate detailed analysis
//! **[Kim Min Su]**
//! - 🎯 Core commonality: Both run payment backends
//! - ⭐ Main feature: 6 years of Go (criteria: tenure)
//! - 💡 Recommendation reason: ...
//! - 🔗 Similarity factor: ...
//! **Lee Ji Eun**
//! ...
//! ```
//!
//! Parsing never fails. A missing report, a failed report, or one without the
//! section marker gives an empty map.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::explanation::cleanup::FieldCleaner;
use crate::explanation::dialect::{DialectError, FieldKey, FieldMarker, ReportDialect};

/// Bold entity name, optionally bracketed inside or outside the emphasis:
/// `**Name**`, `**[Name]**`, `[**Name**]`.
static ENTITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?\*\*\[?([^*\[\]\n]+?)\]?\*\*\]?").expect("static regex")
});

/// Report text as produced upstream. `success: false` means the producer gave up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

impl NarrativeReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            text: None,
            success: false,
        }
    }

    /// Text to parse, if the report is usable at all.
    pub fn usable_text(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// One parsed field: cleaned text, or unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum FieldValue {
    Resolved(String),
    #[default]
    Unresolved,
}

impl FieldValue {
    pub fn as_resolved(&self) -> Option<&str> {
        match self {
            FieldValue::Resolved(text) => Some(text),
            FieldValue::Unresolved => None,
        }
    }

    /// Display text; `fallback` stands in for unresolved fields.
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.as_resolved().unwrap_or(fallback)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Unresolved, FieldValue::Resolved)
    }
}

/// The four analysis fields for one entity, indexed by `FieldKey::index`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityAnalysisBlock {
    fields: [FieldValue; 4],
}

impl EntityAnalysisBlock {
    pub fn get(&self, key: FieldKey) -> &FieldValue {
        &self.fields[key.index()]
    }

    pub fn set(&mut self, key: FieldKey, value: FieldValue) {
        self.fields[key.index()] = value;
    }

    pub fn is_fully_unresolved(&self) -> bool {
        self.fields.iter().all(|f| *f == FieldValue::Unresolved)
    }
}

/// Entity name (as written in the report) to block, in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityBlockMap {
    entries: Vec<(String, EntityAnalysisBlock)>,
}

impl EntityBlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated name replaces the earlier block but keeps its position.
    pub fn insert(&mut self, name: String, block: EntityAnalysisBlock) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = block,
            None => self.entries.push((name, block)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityAnalysisBlock> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, block)| block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityAnalysisBlock)> {
        self.entries.iter().map(|(k, block)| (k.as_str(), block))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parser compiled for one dialect. Build once, share across requests.
#[derive(Debug, Clone)]
pub struct ReportParser {
    dialect: ReportDialect,
    cleaner: FieldCleaner,
}

impl ReportParser {
    pub fn new(dialect: ReportDialect) -> Result<Self, DialectError> {
        dialect.validate()?;
        let cleaner = FieldCleaner::new(&dialect.criteria_marker)?;
        Ok(Self { dialect, cleaner })
    }

    pub fn dialect(&self) -> &ReportDialect {
        &self.dialect
    }

    /// Parses an optional report into an entity block map.
    pub fn parse_report(&self, report: Option<&NarrativeReport>) -> EntityBlockMap {
        match report.and_then(NarrativeReport::usable_text) {
            Some(text) => self.parse(text),
            None => {
                debug!("no usable analysis report");
                EntityBlockMap::new()
            }
        }
    }

    /// Parses report text into an entity block map.
    pub fn parse(&self, report: &str) -> EntityBlockMap {
        let mut blocks = EntityBlockMap::new();

        let Some(section) = self.analysis_section(report) else {
            debug!(
                marker = %self.dialect.section_marker,
                "analysis section marker not found in report"
            );
            return blocks;
        };

        for (name, body) in split_entities(section) {
            let name = name.trim_matches(|c| c == '[' || c == ']').trim();
            if name.is_empty() {
                continue;
            }
            blocks.insert(name.to_string(), self.parse_block(body));
        }

        debug!(entities = blocks.len(), "parsed analysis report");
        blocks
    }

    fn analysis_section<'a>(&self, report: &'a str) -> Option<&'a str> {
        let marker = self.dialect.section_marker.as_str();
        report
            .find(marker)
            .map(|start| &report[start + marker.len()..])
    }

    fn parse_block(&self, body: &str) -> EntityAnalysisBlock {
        let mut block = EntityAnalysisBlock::default();

        for marker in &self.dialect.fields {
            let value = extract_field(body, marker)
                .and_then(|raw| self.cleaner.apply(raw, &marker.cleanup));
            if value.is_none() {
                debug!(field = %marker.key, "analysis field unresolved");
            }
            block.set(marker.key, value.into());
        }

        block
    }
}

/// Pairs each bold entity name with the text up to the next name.
/// Text before the first name is dropped.
fn split_entities(section: &str) -> Vec<(&str, &str)> {
    let matches: Vec<_> = ENTITY_NAME.captures_iter(section).collect();
    let mut pairs = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(section.len(), |m| m.start());
        pairs.push((name.as_str(), &section[whole.end()..body_end]));
    }

    if pairs.is_empty() && !section.trim().is_empty() {
        warn!("analysis section present but no entity names found");
    }

    pairs
}

/// Text between the field's start marker and its stop marker (or body end).
fn extract_field<'a>(body: &'a str, marker: &FieldMarker) -> Option<&'a str> {
    let start = body.find(&marker.start_marker)? + marker.start_marker.len();
    let rest = &body[start..];
    let end = marker
        .stop_marker
        .as_deref()
        .and_then(|stop| rest.find(stop))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
