//! Offline evaluation of generated SQL against reference queries.

pub mod harness;
pub mod report;
pub mod similarity;

pub use harness::{EvaluationCase, EvaluationOutcome, EvaluationStatus, Evaluator, load_cases};
pub use report::{CategoryStats, EvaluationReport};
pub use similarity::{SimilarityCategory, SimilarityResult, SimilarityScorer, compare_queries};
