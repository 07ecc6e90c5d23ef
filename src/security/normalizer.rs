//! Query normalization shared by validation and similarity scoring.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for normalizing whitespace.
static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace pattern"));

/// Statement terminator.
pub const TERMINATOR: char = ';';

/// A query with whitespace collapsed and trailing terminators removed.
///
/// Keeps the original casing for output and an upper-cased copy for keyword
/// matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    text: String,
    upper: String,
}

impl NormalizedQuery {
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let upper = text.to_uppercase();
        Self { text, upper }
    }

    /// Normalized text in original case.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Normalized text upper-cased for keyword matching.
    pub fn upper(&self) -> &str {
        &self.upper
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First whitespace-delimited token of the upper-cased text.
    pub fn leading_token(&self) -> Option<&str> {
        self.upper.split(' ').next().filter(|t| !t.is_empty())
    }
}

/// Collapse whitespace runs into single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Remove trailing terminators, including whitespace between repeated ones.
pub fn strip_terminators(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == TERMINATOR || c.is_whitespace())
}

/// Normalize a raw query without changing its case.
///
/// Idempotent: `normalize(&normalize(q)) == normalize(q)`.
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    strip_terminators(&collapsed).to_string()
}
