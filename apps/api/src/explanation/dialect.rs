//! Report dialect — the marker table that tells the report parser where each
//! field starts and stops.
//!
//! Kept as data so a new report format is a new table (or a JSON file pointed
//! to by `REPORT_DIALECT_PATH`), not a parser change.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four explanation fields, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CoreCommonality,
    MainFeature,
    RecommendationReason,
    SimilarityFactor,
}

impl FieldKey {
    pub const ALL: [FieldKey; 4] = [
        FieldKey::CoreCommonality,
        FieldKey::MainFeature,
        FieldKey::RecommendationReason,
        FieldKey::SimilarityFactor,
    ];

    pub fn index(self) -> usize {
        match self {
            FieldKey::CoreCommonality => 0,
            FieldKey::MainFeature => 1,
            FieldKey::RecommendationReason => 2,
            FieldKey::SimilarityFactor => 3,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKey::CoreCommonality => "core_commonality",
            FieldKey::MainFeature => "main_feature",
            FieldKey::RecommendationReason => "recommendation_reason",
            FieldKey::SimilarityFactor => "similarity_factor",
        };
        f.write_str(name)
    }
}

/// Text cleanup applied to a raw field value. See `cleanup::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStep {
    StripCriteriaAside,
    StripQuotes,
    StripTrailingDash,
    CollapseWhitespace,
    RejectPlaceholder,
}

impl CleanupStep {
    /// Later steps assume the earlier ones already ran.
    pub const STANDARD: [CleanupStep; 5] = [
        CleanupStep::StripCriteriaAside,
        CleanupStep::StripQuotes,
        CleanupStep::StripTrailingDash,
        CleanupStep::CollapseWhitespace,
        CleanupStep::RejectPlaceholder,
    ];
}

fn standard_cleanup() -> Vec<CleanupStep> {
    CleanupStep::STANDARD.to_vec()
}

/// One row of the marker table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMarker {
    pub key: FieldKey,
    pub icon: String,
    pub label: String,
    pub start_marker: String,
    /// `None` runs the field to the end of the entity body.
    #[serde(default)]
    pub stop_marker: Option<String>,
    #[serde(default = "standard_cleanup")]
    pub cleanup: Vec<CleanupStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDialect {
    pub section_marker: String,
    pub criteria_marker: String,
    pub fallback_text: String,
    pub fields: Vec<FieldMarker>,
}

#[derive(Debug, Error)]
pub enum DialectError {
    #[error("failed to read dialect file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dialect JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dialect is missing field '{0}'")]
    MissingField(FieldKey),

    #[error("dialect defines field '{0}' more than once")]
    DuplicateField(FieldKey),

    #[error("dialect marker '{0}' is empty")]
    EmptyMarker(&'static str),

    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ReportDialect {
    /// Built-in dialect matching the analysis prompt used by the recommendation service.
    pub fn standard() -> Self {
        let field = |key, icon: &str, label: &str, stop: Option<&str>| FieldMarker {
            key,
            icon: icon.to_string(),
            label: label.to_string(),
            start_marker: format!("{icon} {label}:"),
            stop_marker: stop.map(str::to_string),
            cleanup: standard_cleanup(),
        };

        Self {
            section_marker: "Per-candidate detailed analysis".to_string(),
            criteria_marker: "criteria:".to_string(),
            fallback_text: "No analysis available".to_string(),
            fields: vec![
                field(FieldKey::CoreCommonality, "🎯", "Core commonality", Some("⭐")),
                field(FieldKey::MainFeature, "⭐", "Main feature", Some("💡")),
                field(
                    FieldKey::RecommendationReason,
                    "💡",
                    "Recommendation reason",
                    Some("🔗"),
                ),
                field(FieldKey::SimilarityFactor, "🔗", "Similarity factor", None),
            ],
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DialectError> {
        let raw = std::fs::read_to_string(path)?;
        let dialect: Self = serde_json::from_str(&raw)?;
        dialect.validate()?;
        Ok(dialect)
    }

    /// Every field key exactly once, no empty markers.
    pub fn validate(&self) -> Result<(), DialectError> {
        if self.section_marker.trim().is_empty() {
            return Err(DialectError::EmptyMarker("section_marker"));
        }
        if self.criteria_marker.trim().is_empty() {
            return Err(DialectError::EmptyMarker("criteria_marker"));
        }

        for key in FieldKey::ALL {
            let mut rows = self.fields.iter().filter(|f| f.key == key);
            let row = rows.next().ok_or(DialectError::MissingField(key))?;
            if rows.next().is_some() {
                return Err(DialectError::DuplicateField(key));
            }
            if row.start_marker.trim().is_empty() {
                return Err(DialectError::EmptyMarker("start_marker"));
            }
            if row.stop_marker.as_deref().is_some_and(|m| m.trim().is_empty()) {
                return Err(DialectError::EmptyMarker("stop_marker"));
            }
        }

        Ok(())
    }

    pub fn field(&self, key: FieldKey) -> Option<&FieldMarker> {
        self.fields.iter().find(|f| f.key == key)
    }
}
