//! Aggregated statistics over an evaluation run.

use crate::evaluation::harness::{EvaluationOutcome, EvaluationStatus};
use crate::evaluation::similarity::SimilarityCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: usize,
    pub accepted: usize,
    /// Mean similarity over cases with extracted SQL.
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub status_counts: BTreeMap<EvaluationStatus, usize>,
    pub similarity_counts: BTreeMap<SimilarityCategory, usize>,
    pub categories: BTreeMap<String, CategoryStats>,
    pub average_score: Option<f64>,
    /// Ids of cases that were not accepted.
    pub failed_cases: Vec<u32>,
    pub outcomes: Vec<EvaluationOutcome>,
}

fn mean(scores: &[f64]) -> Option<f64> {
    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
}

impl EvaluationReport {
    pub fn from_outcomes(outcomes: Vec<EvaluationOutcome>) -> Self {
        let mut status_counts = BTreeMap::new();
        let mut similarity_counts = BTreeMap::new();
        let mut category_scores: BTreeMap<String, (CategoryStats, Vec<f64>)> = BTreeMap::new();
        let mut scores = Vec::new();
        let mut failed_cases = Vec::new();

        for outcome in &outcomes {
            *status_counts.entry(outcome.status).or_insert(0) += 1;

            let (stats, category_score_list) =
                category_scores.entry(outcome.category.clone()).or_default();
            stats.total += 1;

            if outcome.status == EvaluationStatus::Accepted {
                stats.accepted += 1;
            } else {
                failed_cases.push(outcome.id);
            }

            if let Some(similarity) = outcome.similarity {
                *similarity_counts.entry(similarity.category).or_insert(0) += 1;
                category_score_list.push(similarity.score);
                scores.push(similarity.score);
            }
        }

        let categories = category_scores
            .into_iter()
            .map(|(name, (mut stats, list))| {
                stats.average_score = mean(&list);
                (name, stats)
            })
            .collect();

        Self {
            total: outcomes.len(),
            status_counts,
            similarity_counts,
            categories,
            average_score: mean(&scores),
            failed_cases,
            outcomes,
        }
    }

    pub fn count(&self, status: EvaluationStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// Percentage of cases with the given status.
    pub fn rate(&self, status: EvaluationStatus) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(status) as f64 * 100.0 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::similarity::SimilarityResult;

    fn outcome(
        id: u32,
        category: &str,
        status: EvaluationStatus,
        score: Option<(SimilarityCategory, f64)>,
    ) -> EvaluationOutcome {
        EvaluationOutcome {
            id,
            category: category.into(),
            question: String::new(),
            expected_sql: String::new(),
            generated_sql: score.map(|_| "SELECT 1".into()),
            status,
            reason: None,
            detail: None,
            similarity: score.map(|(category, score)| SimilarityResult { category, score }),
        }
    }

    fn sample() -> EvaluationReport {
        EvaluationReport::from_outcomes(vec![
            outcome(
                1,
                "grouping",
                EvaluationStatus::Accepted,
                Some((SimilarityCategory::ExactMatch, 100.0)),
            ),
            outcome(
                2,
                "grouping",
                EvaluationStatus::Rejected,
                Some((SimilarityCategory::LowSimilarity, 40.0)),
            ),
            outcome(3, "filtering", EvaluationStatus::NoSqlExtracted, None),
            outcome(
                4,
                "filtering",
                EvaluationStatus::Accepted,
                Some((SimilarityCategory::HighSimilarity, 85.0)),
            ),
        ])
    }

    #[test]
    fn test_status_counts() {
        let report = sample();
        assert_eq!(report.total, 4);
        assert_eq!(report.count(EvaluationStatus::Accepted), 2);
        assert_eq!(report.count(EvaluationStatus::Rejected), 1);
        assert_eq!(report.count(EvaluationStatus::NoSqlExtracted), 1);
        assert_eq!(report.rate(EvaluationStatus::Accepted), 50.0);
        assert_eq!(report.failed_cases, vec![2, 3]);
    }

    #[test]
    fn test_category_stats() {
        let report = sample();
        let grouping = &report.categories["grouping"];
        assert_eq!(grouping.total, 2);
        assert_eq!(grouping.accepted, 1);
        assert_eq!(grouping.average_score, Some(70.0));

        let filtering = &report.categories["filtering"];
        assert_eq!(filtering.accepted, 1);
        assert_eq!(filtering.average_score, Some(85.0));
    }

    #[test]
    fn test_average_and_histogram() {
        let report = sample();
        assert_eq!(report.average_score, Some(75.0));
        assert_eq!(report.similarity_counts[&SimilarityCategory::ExactMatch], 1);
        assert_eq!(
            report.similarity_counts.get(&SimilarityCategory::MediumSimilarity),
            None
        );
    }

    #[test]
    fn test_empty_report() {
        let report = EvaluationReport::from_outcomes(vec![]);
        assert_eq!(report.average_score, None);
        assert_eq!(report.rate(EvaluationStatus::Accepted), 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["status_counts"]["accepted"], 2);
        assert_eq!(json["similarity_counts"]["exact_match"], 1);
        assert_eq!(json["categories"]["grouping"]["total"], 2);
    }
}
