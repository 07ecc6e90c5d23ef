//! Runs recorded model responses through extraction, validation and scoring.

use crate::config::GuardConfig;
use crate::error::{EvaluationError, Result};
use crate::evaluation::report::EvaluationReport;
use crate::evaluation::similarity::{SimilarityResult, SimilarityScorer};
use crate::extract::extract_sql;
use crate::security::{ReasonCode, SqlValidator, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// One question from the evaluation corpus with the model's recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCase {
    pub id: u32,
    pub question: String,
    pub category: String,
    pub expected_sql: String,
    /// Raw model response; empty when the model produced nothing.
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// SQL was extracted and passed validation.
    Accepted,
    /// SQL was extracted but the validator rejected it.
    Rejected,
    NoSqlExtracted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub id: u32,
    pub category: String,
    pub question: String,
    pub expected_sql: String,
    pub generated_sql: Option<String>,
    pub status: EvaluationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub similarity: Option<SimilarityResult>,
}

/// Evaluates cases against one table with a fixed validator and scorer.
#[derive(Debug, Clone)]
pub struct Evaluator {
    validator: SqlValidator,
    scorer: SimilarityScorer,
    table_name: String,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::from_config(&GuardConfig::default())
    }
}

impl Evaluator {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            validator: SqlValidator::new(),
            scorer: SimilarityScorer::with_config(config.scoring.clone()),
            table_name: config.table_name.clone(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn evaluate(&self, case: &EvaluationCase) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome {
            id: case.id,
            category: case.category.clone(),
            question: case.question.clone(),
            expected_sql: case.expected_sql.clone(),
            generated_sql: None,
            status: EvaluationStatus::NoSqlExtracted,
            reason: None,
            detail: None,
            similarity: None,
        };

        let Some(generated) = extract_sql(&case.response) else {
            warn!("Test #{}: no SQL extracted", case.id);
            return outcome;
        };

        outcome.similarity =
            Some(self.scorer.compare(&generated, &case.expected_sql, &self.table_name));

        match self.validator.validate(&generated) {
            Verdict::Safe { .. } => {
                outcome.status = EvaluationStatus::Accepted;
            }
            Verdict::Unsafe { reason, detail } => {
                warn!("Test #{}: generated SQL rejected: {}", case.id, detail);
                outcome.status = EvaluationStatus::Rejected;
                outcome.reason = Some(reason);
                outcome.detail = Some(detail);
            }
        }

        debug!(
            "Test #{}: {:?}, similarity {:?}",
            case.id, outcome.status, outcome.similarity
        );
        outcome.generated_sql = Some(generated);
        outcome
    }

    /// Evaluate a whole corpus. Ids must be unique.
    pub fn run(&self, cases: &[EvaluationCase]) -> Result<EvaluationReport> {
        if cases.is_empty() {
            return Err(EvaluationError::EmptyCorpus.into());
        }

        let mut seen = HashSet::new();
        if let Some(case) = cases.iter().find(|c| !seen.insert(c.id)) {
            return Err(EvaluationError::DuplicateCase(case.id).into());
        }

        info!("Running {} evaluation cases", cases.len());
        let outcomes = cases.iter().map(|case| self.evaluate(case)).collect();
        let report = EvaluationReport::from_outcomes(outcomes);
        info!(
            "Evaluation complete: {}/{} accepted",
            report.count(EvaluationStatus::Accepted),
            report.total
        );
        Ok(report)
    }
}

/// Load an evaluation corpus from a JSON array.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<EvaluationCase>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
