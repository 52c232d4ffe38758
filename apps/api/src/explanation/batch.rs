//! One recommendation batch: the report is parsed once up front and the
//! resulting block map is reused for every record in the batch.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::explanation::report_parser::{EntityBlockMap, NarrativeReport, ReportParser};
use crate::explanation::skills::SkillList;
use crate::explanation::synthesizer::{
    explain_with_source, ExplanationQuadruple, ExplanationSource,
};
use crate::models::recommendation::{CandidateEntity, RecommendationRecord};

/// A record's explanation, ready for the result cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainedRecommendation {
    pub candidate_name: String,
    pub final_score: f64,
    pub skills: SkillList,
    pub source: ExplanationSource,
    pub explanation: ExplanationQuadruple,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub narrative: usize,
    pub computed: usize,
    pub report_entities: usize,
}

pub struct ExplanationBatch<'p> {
    parser: &'p ReportParser,
    blocks: EntityBlockMap,
}

impl<'p> ExplanationBatch<'p> {
    pub fn new(parser: &'p ReportParser, report: Option<&NarrativeReport>) -> Self {
        Self {
            parser,
            blocks: parser.parse_report(report),
        }
    }

    pub fn blocks(&self) -> &EntityBlockMap {
        &self.blocks
    }

    pub fn explain(
        &self,
        record: &RecommendationRecord,
        target: &CandidateEntity,
    ) -> ExplainedRecommendation {
        let (source, explanation) =
            explain_with_source(record, target, &self.blocks, self.parser.dialect());

        ExplainedRecommendation {
            candidate_name: record.candidate.name.clone(),
            final_score: record.final_score,
            skills: SkillList::normalize(&record.candidate.skills),
            source,
            explanation,
        }
    }

    pub fn explain_all(
        &self,
        records: &[RecommendationRecord],
        target: &CandidateEntity,
    ) -> (Vec<ExplainedRecommendation>, BatchSummary) {
        let explained: Vec<_> = records.iter().map(|r| self.explain(r, target)).collect();

        let narrative = explained
            .iter()
            .filter(|e| e.source == ExplanationSource::Narrative)
            .count();
        let summary = BatchSummary {
            total: explained.len(),
            narrative,
            computed: explained.len() - narrative,
            report_entities: self.blocks.len(),
        };

        info!(
            total = summary.total,
            narrative = summary.narrative,
            computed = summary.computed,
            report_entities = summary.report_entities,
            "explained recommendation batch"
        );

        (explained, summary)
    }
}
