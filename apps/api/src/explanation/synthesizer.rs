#![allow(dead_code)]

//! Explanation synthesizer — builds the four-line "why was this candidate
//! recommended" card for one recommendation.
//!
//! Two paths, tried in order:
//! 1. Narrative: the analysis report has a block for this candidate; its four
//!    fields are used as-is (unresolved fields show the dialect fallback text).
//! 2. Computed: no block matched; each line is derived from the record's
//!    position, experience, skills, scores and search methods.
//!
//! Both paths always produce exactly four items in `FieldKey::ALL` order.

use serde::{Deserialize, Serialize};

use crate::explanation::dialect::{FieldKey, ReportDialect};
use crate::explanation::matcher::match_entity;
use crate::explanation::report_parser::{EntityAnalysisBlock, EntityBlockMap};
use crate::explanation::skills::SkillList;
use crate::models::recommendation::{CandidateEntity, RecommendationRecord};

/// Skills named in the core-commonality line when positions differ.
const MAX_SHARED_SKILLS_SHOWN: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationItem {
    pub icon: String,
    pub label: String,
    pub text: String,
}

/// Exactly four items: core commonality, main feature, recommendation reason,
/// similarity factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplanationQuadruple([ExplanationItem; 4]);

impl ExplanationQuadruple {
    pub fn items(&self) -> &[ExplanationItem; 4] {
        &self.0
    }

    pub fn get(&self, key: FieldKey) -> &ExplanationItem {
        &self.0[key.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Narrative,
    Computed,
}

/// Explains one recommendation against the search target.
pub fn explain(
    record: &RecommendationRecord,
    target: &CandidateEntity,
    blocks: &EntityBlockMap,
    dialect: &ReportDialect,
) -> ExplanationQuadruple {
    explain_with_source(record, target, blocks, dialect).1
}

/// Same as `explain`, also reporting which path produced the result.
pub fn explain_with_source(
    record: &RecommendationRecord,
    target: &CandidateEntity,
    blocks: &EntityBlockMap,
    dialect: &ReportDialect,
) -> (ExplanationSource, ExplanationQuadruple) {
    match match_entity(&record.candidate.name, blocks) {
        Some(block) => (ExplanationSource::Narrative, from_block(block, dialect)),
        None => (
            ExplanationSource::Computed,
            build(dialect, |key| computed_text(key, record, target)),
        ),
    }
}

fn from_block(block: &EntityAnalysisBlock, dialect: &ReportDialect) -> ExplanationQuadruple {
    build(dialect, |key| {
        block.get(key).text_or(&dialect.fallback_text).to_string()
    })
}

fn build(
    dialect: &ReportDialect,
    mut text_for: impl FnMut(FieldKey) -> String,
) -> ExplanationQuadruple {
    ExplanationQuadruple(FieldKey::ALL.map(|key| {
        let (icon, label) = dialect
            .field(key)
            .map(|f| (f.icon.clone(), f.label.clone()))
            .unwrap_or_else(|| (String::new(), key.to_string()));
        ExplanationItem {
            icon,
            label,
            text: text_for(key),
        }
    }))
}

fn computed_text(
    key: FieldKey,
    record: &RecommendationRecord,
    target: &CandidateEntity,
) -> String {
    match key {
        FieldKey::CoreCommonality => core_commonality(&record.candidate, target),
        FieldKey::MainFeature => main_feature(&record.candidate),
        FieldKey::RecommendationReason => recommendation_reason(record),
        FieldKey::SimilarityFactor => similarity_factor(record),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn core_commonality(candidate: &CandidateEntity, target: &CandidateEntity) -> String {
    let candidate_position = non_blank(candidate.position.as_deref());
    let target_position = non_blank(target.position.as_deref());
    if let (Some(position), Some(other)) = (candidate_position, target_position) {
        if position == other {
            return format!("Both work as {position}");
        }
    }

    let shared = shared_skills(
        &SkillList::normalize(&target.skills),
        &SkillList::normalize(&candidate.skills),
    );
    if shared.is_empty() {
        return "Similar overall competency profile".to_string();
    }

    let shown: Vec<&str> = shared
        .iter()
        .take(MAX_SHARED_SKILLS_SHOWN)
        .map(String::as_str)
        .collect();
    format!("Shared skills: {}", shown.join(", "))
}

/// Target skills that contain, or are contained in, some candidate skill
/// (case-insensitive, trimmed). Target order is kept.
pub(crate) fn shared_skills(target: &[String], candidate: &[String]) -> Vec<String> {
    let candidate_lower: Vec<String> = candidate
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    target
        .iter()
        .filter(|skill| {
            let wanted = skill.trim().to_lowercase();
            !wanted.is_empty()
                && candidate_lower
                    .iter()
                    .any(|c| c.contains(&wanted) || wanted.contains(c.as_str()))
        })
        .map(|skill| skill.trim().to_string())
        .collect()
}

fn main_feature(candidate: &CandidateEntity) -> String {
    let position = non_blank(candidate.position.as_deref()).unwrap_or("Unspecified role");
    match non_blank(candidate.experience.as_deref()) {
        Some(experience) => format!("{position}, experience {experience}"),
        None => format!("{position}, no experience data"),
    }
}

fn recommendation_reason(record: &RecommendationRecord) -> String {
    if record.vector_score > record.keyword_score {
        "Overall profile closely resembles the target (profile similarity)".to_string()
    } else if record.keyword_score > record.vector_score {
        "Resume keywords closely match the target (keyword match)".to_string()
    } else {
        "Recommended by combined profile and keyword analysis".to_string()
    }
}

fn similarity_factor(record: &RecommendationRecord) -> String {
    if record.search_methods.len() > 1 {
        format!(
            "Verified by multiple search methods ({})",
            record.search_methods.join(", ")
        )
    } else if record.found_by_vector() {
        "Similar skills and experience".to_string()
    } else {
        "Matched on resume keywords".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explanation::report_parser::FieldValue;
    use serde_json::json;

    fn candidate(name: &str, position: Option<&str>, skills: serde_json::Value) -> CandidateEntity {
        CandidateEntity {
            name: name.to_string(),
            position: position.map(str::to_string),
            experience: None,
            skills,
        }
    }

    fn record(candidate: CandidateEntity) -> RecommendationRecord {
        RecommendationRecord {
            candidate,
            final_score: 0.8,
            vector_score: 0.5,
            keyword_score: 0.5,
            search_methods: vec![],
        }
    }

    fn target() -> CandidateEntity {
        candidate(
            "Target",
            Some("Backend Engineer"),
            json!("['Python', 'PostgreSQL', 'Docker', 'AWS']"),
        )
    }

    fn text(q: &ExplanationQuadruple, key: FieldKey) -> &str {
        &q.get(key).text
    }

    #[test]
    fn test_empty_blocks_take_computed_path() {
        let dialect = ReportDialect::standard();
        let rec = record(candidate("Kim", Some("Designer"), json!([])));
        let (source, q) = explain_with_source(&rec, &target(), &EntityBlockMap::new(), &dialect);
        assert_eq!(source, ExplanationSource::Computed);
        assert_eq!(q.items().len(), 4);
    }

    #[test]
    fn test_same_position_wins_over_skills() {
        let dialect = ReportDialect::standard();
        let rec = record(candidate("Kim", Some("Backend Engineer"), json!(["Figma"])));
        let q = explain(&rec, &target(), &EntityBlockMap::new(), &dialect);
        assert_eq!(
            text(&q, FieldKey::CoreCommonality),
            "Both work as Backend Engineer"
        );
    }

    #[test]
    fn test_shared_skills_named_up_to_two() {
        let dialect = ReportDialect::standard();
        let rec = record(candidate(
            "Kim",
            Some("Data Engineer"),
            json!("postgresql, docker compose, aws"),
        ));
        let q = explain(&rec, &target(), &EntityBlockMap::new(), &dialect);
        assert_eq!(
            text(&q, FieldKey::CoreCommonality),
            "Shared skills: PostgreSQL, Docker"
        );
    }

    #[test]
    fn test_no_overlap_is_generic() {
        let dialect = ReportDialect::standard();
        let rec = record(candidate("Kim", None, json!(["Figma", "Sketch"])));
        let q = explain(&rec, &target(), &EntityBlockMap::new(), &dialect);
        assert_eq!(
            text(&q, FieldKey::CoreCommonality),
            "Similar overall competency profile"
        );
    }

    #[test]
    fn test_blank_positions_are_not_a_same_role() {
        let dialect = ReportDialect::standard();
        let mut tgt = target();
        tgt.position = Some(" ".to_string());
        let rec = record(candidate("Kim", Some(" "), json!([])));
        let q = explain(&rec, &tgt, &EntityBlockMap::new(), &dialect);
        assert_eq!(
            text(&q, FieldKey::CoreCommonality),
            "Similar overall competency profile"
        );
    }

    #[test]
    fn test_shared_skills_substring_both_directions() {
        let target = vec!["React".to_string(), "Node.js".to_string(), "Go".to_string()];
        let candidate = vec!["react native".to_string(), "node".to_string(), "  ".to_string()];
        assert_eq!(shared_skills(&target, &candidate), vec!["React", "Node.js"]);
    }

    #[test]
    fn test_blank_skills_never_match() {
        let target = vec!["  ".to_string()];
        let candidate = vec!["Rust".to_string()];
        assert!(shared_skills(&target, &candidate).is_empty());
    }

    #[test]
    fn test_main_feature_defaults() {
        let bare = candidate("Kim", None, json!(null));
        assert_eq!(main_feature(&bare), "Unspecified role, no experience data");

        let mut full = candidate("Kim", Some("SRE"), json!(null));
        full.experience = Some("7 years".to_string());
        assert_eq!(main_feature(&full), "SRE, experience 7 years");
    }

    #[test]
    fn test_recommendation_reason_by_score() {
        let mut rec = record(CandidateEntity::default());
        rec.vector_score = 0.9;
        rec.keyword_score = 0.3;
        assert!(recommendation_reason(&rec).contains("profile similarity"));

        rec.vector_score = 0.1;
        assert!(recommendation_reason(&rec).contains("keyword match"));

        rec.vector_score = 0.3;
        assert!(recommendation_reason(&rec).contains("combined"));

        rec.vector_score = f64::NAN;
        assert!(recommendation_reason(&rec).contains("combined"));
    }

    #[test]
    fn test_similarity_factor_by_methods() {
        let mut rec = record(CandidateEntity::default());
        rec.search_methods = vec!["vector".into(), "keyword".into()];
        assert!(similarity_factor(&rec).starts_with("Verified by multiple search methods"));

        rec.search_methods = vec!["vector".into()];
        assert_eq!(similarity_factor(&rec), "Similar skills and experience");

        rec.search_methods = vec!["keyword".into()];
        assert_eq!(similarity_factor(&rec), "Matched on resume keywords");

        rec.search_methods.clear();
        assert_eq!(similarity_factor(&rec), "Matched on resume keywords");
    }

    #[test]
    fn test_narrative_path_uses_block_and_fallback_text() {
        let dialect = ReportDialect::standard();
        let mut block = EntityAnalysisBlock::default();
        block.set(
            FieldKey::MainFeature,
            FieldValue::Resolved("Payments lead".to_string()),
        );
        let mut blocks = EntityBlockMap::new();
        blocks.insert("Kim Min Su".to_string(), block);

        let rec = record(candidate("KimMinSu", Some("Backend Engineer"), json!([])));
        let (source, q) = explain_with_source(&rec, &target(), &blocks, &dialect);

        assert_eq!(source, ExplanationSource::Narrative);
        assert_eq!(text(&q, FieldKey::MainFeature), "Payments lead");
        assert_eq!(text(&q, FieldKey::CoreCommonality), dialect.fallback_text);
        assert_eq!(text(&q, FieldKey::SimilarityFactor), dialect.fallback_text);
    }

    #[test]
    fn test_items_follow_dialect_icons_and_order() {
        let dialect = ReportDialect::standard();
        let rec = record(candidate("Kim", None, json!([])));
        let q = explain(&rec, &target(), &EntityBlockMap::new(), &dialect);
        let icons: Vec<&str> = q.items().iter().map(|i| i.icon.as_str()).collect();
        assert_eq!(icons, vec!["🎯", "⭐", "💡", "🔗"]);
        assert_eq!(q.get(FieldKey::RecommendationReason).label, "Recommendation reason");
        assert!(q.items().iter().all(|i| !i.text.is_empty()));
    }

    #[test]
    fn test_quadruple_serializes_as_array_of_four() {
        let dialect = ReportDialect::standard();
        let q = explain(
            &record(CandidateEntity::default()),
            &CandidateEntity::default(),
            &EntityBlockMap::new(),
            &dialect,
        );
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(4));
        assert!(value[0].get("icon").is_some());
    }
}
