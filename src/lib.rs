//! Safety gate and similarity scoring for LLM-generated SQL.
//!
//! Validates untrusted SQL before it reaches a read-only analytical database
//! and scores generated queries against reference queries for evaluation.
//!
//! # Example
//!
//! ```
//! use sql_guard::{ReasonCode, SqlValidator, compare_queries};
//!
//! let validator = SqlValidator::new();
//!
//! let verdict = validator.validate("SELECT * FROM freelancer_earnings LIMIT 10;");
//! assert_eq!(verdict.cleaned_query(), Some("SELECT * FROM freelancer_earnings LIMIT 10"));
//!
//! let verdict = validator.validate("DROP TABLE freelancer_earnings");
//! assert_eq!(verdict.reason(), Some(ReasonCode::DisallowedLeadingCommand));
//!
//! let result = compare_queries(
//!     "select count(*) from freelancer_earnings",
//!     "SELECT COUNT(*) FROM freelancer_earnings",
//!     "freelancer_earnings",
//! );
//! assert_eq!(result.score, 100.0);
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod security;

pub use config::{GuardConfig, GuardConfigBuilder, MarkerWeight, ScoringConfig};
pub use error::{GuardError, Result, SecurityError};
pub use evaluation::{
    EvaluationCase, EvaluationReport, Evaluator, SimilarityCategory, SimilarityResult,
    SimilarityScorer, compare_queries,
};
pub use extract::extract_sql;
pub use security::{Command, ReasonCode, SqlValidator, Verdict, policy_summary, validate};
