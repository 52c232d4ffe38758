#![allow(dead_code)]

//! Skill list normalizer — turns whatever shape a `skills` field arrives in into
//! an ordered list of skill tokens.
//!
//! Accepted shapes: a JSON array, a JSON-array string (`["Rust", "SQL"]`), a
//! Python-repr string (`['Rust', 'SQL']`), a bare bracket list (`[Rust, SQL]`),
//! comma-separated text, or a single token. Normalization never fails.
//!
//! String inputs run through `STRING_BRANCHES` top to bottom; the first branch
//! whose predicate holds and whose handler produces a list wins.

use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Quote characters stripped from token edges.
pub(crate) const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];

/// Shortest run of non-quote characters enclosed in single or double quotes.
/// The run may be empty so that `''` pairs up instead of shifting every later
/// quote by one.
static QUOTED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']*)["']"#).expect("static regex"));

/// Ordered, possibly empty list of skill tokens. Duplicates and order are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillList(Vec<String>);

/// Deserialized input still goes through `normalize`, so blank entries never
/// survive.
impl<'de> Deserialize<'de> for SkillList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::normalize(&raw))
    }
}

impl SkillList {
    /// Normalizes a raw `skills` value of unknown shape.
    pub fn normalize(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => Self::from_sequence(items),
            Value::String(text) => Self::normalize_str(text),
            _ => Self::default(),
        }
    }

    /// Normalizes a serialized skills string.
    pub fn normalize_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        for branch in STRING_BRANCHES {
            if !(branch.applies)(trimmed) {
                continue;
            }
            if let Some(tokens) = (branch.parse)(trimmed) {
                debug!(branch = branch.name, count = tokens.len(), "skills normalized");
                return Self(tokens);
            }
        }

        Self::default()
    }

    fn from_sequence(items: &[Value]) -> Self {
        Self(items.iter().filter_map(sequence_item).collect())
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for SkillList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<SkillList> for Value {
    fn from(list: SkillList) -> Self {
        Value::Array(list.0.into_iter().map(Value::String).collect())
    }
}

/// Array entries are kept verbatim unless blank; scalars are rendered as text.
fn sequence_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One string-shape recognizer. `parse` returning `None` means "fall through".
pub(crate) struct Branch {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub parse: fn(&str) -> Option<Vec<String>>,
}

/// Strict JSON parsing is only tried when a double quote is present: repr-style
/// single-quoted lists are not JSON and would always fail.
pub(crate) const STRING_BRANCHES: &[Branch] = &[
    Branch {
        name: "json_array",
        applies: |s| is_bracketed(s) && s.contains('"'),
        parse: parse_json_array,
    },
    Branch {
        name: "quoted_tokens",
        applies: is_bracketed,
        parse: parse_quoted_tokens,
    },
    Branch {
        name: "bracket_csv",
        applies: is_bracketed,
        parse: parse_bracket_csv,
    },
    Branch {
        name: "comma_separated",
        applies: |s| s.contains(','),
        parse: parse_comma_separated,
    },
    Branch {
        name: "single_token",
        applies: |_| true,
        parse: parse_single_token,
    },
];

fn is_bracketed(s: &str) -> bool {
    s.starts_with('[') && s.ends_with(']')
}

fn parse_json_array(s: &str) -> Option<Vec<String>> {
    let items: Vec<Value> = serde_json::from_str(s).ok()?;
    Some(items.iter().filter_map(sequence_item).collect())
}

fn parse_quoted_tokens(s: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = QUOTED_TOKEN
        .captures_iter(s)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

/// Last resort for bracketed input. A token that itself contains a comma is
/// split here; there is no way to tell it apart from a separator.
fn parse_bracket_csv(s: &str) -> Option<Vec<String>> {
    debug!("bracketed skills without quoted tokens, splitting on commas");
    let inner = &s[1..s.len() - 1];
    let unquoted: String = inner.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    Some(
        unquoted
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_comma_separated(s: &str) -> Option<Vec<String>> {
    Some(
        s.split(',')
            .map(|piece| strip_quotes(piece.trim()).trim())
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_single_token(s: &str) -> Option<Vec<String>> {
    let token = strip_quotes(s).trim();
    if token.is_empty() {
        Some(Vec::new())
    } else {
        Some(vec![token.to_string()])
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(QUOTE_CHARS)
}
