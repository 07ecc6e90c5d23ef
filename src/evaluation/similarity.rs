//! Structural similarity between a generated query and a reference query.
//!
//! A coarse heuristic for regression reporting over a fixed test corpus: it
//! rewards shared clauses and aggregates and never checks semantic equivalence.

use crate::config::{ScoringConfig, TABLE_PLACEHOLDER};
use crate::security::normalizer::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whitespace around a comma or opening parenthesis.
static OPENING_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([,(])\s*").expect("Invalid regex: opening punctuation spacing"));

/// Whitespace before a closing parenthesis.
static CLOSING_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\)").expect("Invalid regex: closing punctuation spacing"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityCategory {
    ExactMatch,
    HighSimilarity,
    MediumSimilarity,
    LowSimilarity,
}

impl fmt::Display for SimilarityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExactMatch => "exact_match",
            Self::HighSimilarity => "high_similarity",
            Self::MediumSimilarity => "medium_similarity",
            Self::LowSimilarity => "low_similarity",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub category: SimilarityCategory,
    /// In `[0, 100]`.
    pub score: f64,
}

impl SimilarityResult {
    pub fn exact() -> Self {
        Self {
            category: SimilarityCategory::ExactMatch,
            score: 100.0,
        }
    }
}

/// Comparison form of a query: normalized, lower-cased, no spacing around
/// punctuation.
pub fn comparison_key(query: &str) -> String {
    let lowered = normalize(query).to_lowercase();
    let tightened = OPENING_SPACING.replace_all(&lowered, "${1}");
    CLOSING_SPACING.replace_all(&tightened, ")").into_owned()
}

/// Weighted marker-overlap scorer.
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    config: ScoringConfig,
}

impl SimilarityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compare `generated` against `expected` for queries over `table_name`.
    pub fn compare(&self, generated: &str, expected: &str, table_name: &str) -> SimilarityResult {
        let generated = comparison_key(generated);
        let expected = comparison_key(expected);

        if generated == expected {
            return SimilarityResult::exact();
        }

        let table = table_name.trim().to_lowercase();
        let shared: u64 = self
            .config
            .markers
            .iter()
            .filter(|m| {
                // Without a table name the table marker would match any FROM clause
                if table.is_empty() && m.marker.contains(TABLE_PLACEHOLDER) {
                    return false;
                }
                let marker = m.marker.to_lowercase().replace(TABLE_PLACEHOLDER, &table);
                generated.contains(&marker) && expected.contains(&marker)
            })
            .map(|m| u64::from(m.weight))
            .sum();

        let total = self.config.total_weight().max(1);
        let score = (shared as f64 * 100.0 / total as f64).clamp(0.0, 100.0);

        SimilarityResult {
            category: self.categorize(score),
            score,
        }
    }

    fn categorize(&self, score: f64) -> SimilarityCategory {
        if score >= self.config.high_threshold {
            SimilarityCategory::HighSimilarity
        } else if score >= self.config.medium_threshold {
            SimilarityCategory::MediumSimilarity
        } else {
            SimilarityCategory::LowSimilarity
        }
    }
}

/// Compare with the default marker table.
pub fn compare_queries(generated: &str, expected: &str, table_name: &str) -> SimilarityResult {
    SimilarityScorer::new().compare(generated, expected, table_name)
}
