//! Resolves a candidate's name to the analysis block the report wrote for them.
//!
//! Report names and record names drift on spacing ("Kim Min Su" vs "KimMinSu"),
//! so after an exact lookup fails both sides are compared with all whitespace
//! removed. The first key in report order wins.

use tracing::warn;

use crate::explanation::report_parser::{EntityAnalysisBlock, EntityBlockMap};

pub fn match_entity<'a>(
    candidate_name: &str,
    blocks: &'a EntityBlockMap,
) -> Option<&'a EntityAnalysisBlock> {
    if let Some(block) = blocks.get(candidate_name) {
        return Some(block);
    }

    let wanted = strip_whitespace(candidate_name);
    if wanted.is_empty() {
        return None;
    }

    let mut hits = blocks
        .iter()
        .filter(|(key, _)| strip_whitespace(key) == wanted);

    let (first_key, block) = hits.next()?;
    if let Some((other_key, _)) = hits.next() {
        warn!(
            candidate = candidate_name,
            first = first_key,
            other = other_key,
            "ambiguous analysis name match, using first"
        );
    }

    Some(block)
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
