//! Axum route handlers for the Explanation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::explanation::batch::{BatchSummary, ExplainedRecommendation, ExplanationBatch};
use crate::explanation::dialect::FieldKey;
use crate::explanation::report_parser::{EntityAnalysisBlock, NarrativeReport};
use crate::explanation::skills::SkillList;
use crate::models::recommendation::{CandidateEntity, RecommendationRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NormalizeSkillsRequest {
    #[serde(default)]
    pub skills: Value,
}

#[derive(Debug, Serialize)]
pub struct NormalizeSkillsResponse {
    pub skills: SkillList,
}

#[derive(Debug, Deserialize)]
pub struct ParseReportRequest {
    #[serde(default)]
    pub report: Option<NarrativeReport>,
}

#[derive(Debug, Serialize)]
pub struct ParsedEntity {
    pub name: String,
    pub core_commonality: String,
    pub main_feature: String,
    pub recommendation_reason: String,
    pub similarity_factor: String,
}

#[derive(Debug, Serialize)]
pub struct ParseReportResponse {
    pub blocks: Vec<ParsedEntity>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub target: CandidateEntity,
    #[serde(default)]
    pub recommendations: Vec<RecommendationRecord>,
    #[serde(default)]
    pub report: Option<NarrativeReport>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanations: Vec<ExplainedRecommendation>,
    pub summary: BatchSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/skills/normalize
///
/// Normalizes a raw `skills` value of any shape into an ordered token list.
pub async fn handle_normalize_skills(
    Json(request): Json<NormalizeSkillsRequest>,
) -> Json<NormalizeSkillsResponse> {
    Json(NormalizeSkillsResponse {
        skills: SkillList::normalize(&request.skills),
    })
}

/// POST /api/v1/reports/parse
///
/// Returns the per-candidate blocks found in an analysis report, in report order.
/// Useful for checking a new report format against the configured dialect.
pub async fn handle_parse_report(
    State(state): State<AppState>,
    Json(request): Json<ParseReportRequest>,
) -> Json<ParseReportResponse> {
    let parser = &state.report_parser;
    let fallback = parser.dialect().fallback_text.as_str();
    let blocks = parser.parse_report(request.report.as_ref());

    let text = |block: &EntityAnalysisBlock, key: FieldKey| {
        block.get(key).text_or(fallback).to_string()
    };

    Json(ParseReportResponse {
        blocks: blocks
            .iter()
            .map(|(name, block)| ParsedEntity {
                name: name.to_string(),
                core_commonality: text(block, FieldKey::CoreCommonality),
                main_feature: text(block, FieldKey::MainFeature),
                recommendation_reason: text(block, FieldKey::RecommendationReason),
                similarity_factor: text(block, FieldKey::SimilarityFactor),
            })
            .collect(),
    })
}

/// POST /api/v1/recommendations/explain
///
/// Builds the four-line explanation for every recommendation in the batch.
/// The report, if any, is parsed once and shared by all records.
pub async fn handle_explain(
    State(state): State<AppState>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, AppError> {
    let max = state.config.max_batch_size;
    if request.recommendations.len() > max {
        return Err(AppError::Validation(format!(
            "batch of {} recommendations exceeds the limit of {max}",
            request.recommendations.len()
        )));
    }

    let batch = ExplanationBatch::new(&state.report_parser, request.report.as_ref());
    let (explanations, summary) = batch.explain_all(&request.recommendations, &request.target);

    Ok(Json(ExplainResponse {
        explanations,
        summary,
    }))
}
