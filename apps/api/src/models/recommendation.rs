use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A candidate as delivered by the recommendation service.
///
/// `skills` is kept raw: upstream sends lists, JSON-array strings, Python-repr
/// strings or comma-separated text depending on where the record came from.
/// Use `SkillList::normalize` before reading it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateEntity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Value,
}

/// One similarity hit: a candidate plus the scores the search produced for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub candidate: CandidateEntity,
    #[serde(default)]
    pub final_score: f64,
    #[serde(default)]
    pub vector_score: f64,
    #[serde(default)]
    pub keyword_score: f64,
    #[serde(default)]
    pub search_methods: Vec<String>,
}

/// Tag the search service attaches to hits found through embedding similarity.
pub const VECTOR_METHOD: &str = "vector";

impl RecommendationRecord {
    pub fn found_by_vector(&self) -> bool {
        self.search_methods
            .iter()
            .any(|m| m.trim().eq_ignore_ascii_case(VECTOR_METHOD))
    }
}

/// Experience shows up as "5 years", 5, or 5.5 depending on the source system.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
