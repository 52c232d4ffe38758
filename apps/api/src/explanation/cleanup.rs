//! Field text cleanup for values pulled out of the analysis report.
//!
//! Steps run in the order the dialect lists them. The standard order matters:
//! the trailing-dash check must see the text after the criteria aside is gone,
//! and the placeholder check must see collapsed, trimmed text.

use std::sync::LazyLock;

use regex::Regex;

use crate::explanation::dialect::{CleanupStep, DialectError};
use crate::explanation::skills::QUOTE_CHARS;

static TRAILING_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)[-–—•*]\s*$").expect("static regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Cleanup pipeline compiled for one dialect's criteria marker.
#[derive(Debug, Clone)]
pub struct FieldCleaner {
    criteria_aside: Regex,
}

impl FieldCleaner {
    pub fn new(criteria_marker: &str) -> Result<Self, DialectError> {
        let pattern = format!(r"(?i)\(\s*{}[^)]*\)", regex::escape(criteria_marker.trim()));
        Ok(Self {
            criteria_aside: Regex::new(&pattern)?,
        })
    }

    /// Runs `steps` over `raw`. `None` means the field is unresolved.
    pub fn apply(&self, raw: &str, steps: &[CleanupStep]) -> Option<String> {
        let mut text = raw.to_string();

        for step in steps {
            match step {
                CleanupStep::StripCriteriaAside => {
                    text = self.criteria_aside.replace_all(&text, "").into_owned();
                }
                CleanupStep::StripQuotes => text = strip_one_quote_each_end(&text),
                CleanupStep::StripTrailingDash => {
                    text = TRAILING_DASH.replace(&text, "").into_owned();
                }
                CleanupStep::CollapseWhitespace => {
                    text = WHITESPACE_RUN.replace_all(&text, " ").trim().to_string();
                }
                CleanupStep::RejectPlaceholder => {
                    if is_placeholder(&text) {
                        return None;
                    }
                }
            }
        }

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Quotes are looked for on the trimmed text so surrounding newlines do not hide them.
fn strip_one_quote_each_end(text: &str) -> String {
    let mut s = text.trim();
    if let Some(c) = s.chars().next().filter(|c| QUOTE_CHARS.contains(c)) {
        s = &s[c.len_utf8()..];
    }
    if let Some(c) = s.chars().last().filter(|c| QUOTE_CHARS.contains(c)) {
        s = &s[..s.len() - c.len_utf8()];
    }
    s.to_string()
}

/// An unfilled template slot such as `[core commonality of the two candidates]`.
fn is_placeholder(text: &str) -> bool {
    let t = text.trim();
    t.len() >= 2 && t.starts_with('[') && t.ends_with(']')
}
