//! SQL query validator.
//!
//! Runs an ordered chain of checks against a query and stops at the first
//! failure. Only read-only, single-statement queries without comments,
//! catalog access or injection idioms are accepted.

use crate::security::classifier::check_leading_command;
use crate::security::normalizer::{NormalizedQuery, collapse_whitespace, strip_terminators};
use crate::security::patterns::{
    check_dangerous_patterns, check_forbidden_keywords, check_injection_patterns,
};
use crate::security::statements::check_single_statement;
use crate::security::verdict::{ReasonCode, Rejection, Verdict};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Regex for sanitizing line comments (--).
static COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)--.*$").expect("Invalid regex: line comment sanitize pattern"));

/// Regex for sanitizing block comments (/* */).
static BLOCK_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*.*?\*/").expect("Invalid regex: block comment sanitize pattern")
});

/// Validation stages in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    LeadingCommand,
    ForbiddenKeywords,
    DangerousPatterns,
    InjectionPatterns,
    StatementCount,
}

/// Input handed to every check.
struct Candidate<'a> {
    raw: &'a str,
    normalized: &'a NormalizedQuery,
}

type Check = fn(&Candidate<'_>) -> Option<Rejection>;

fn leading_command(c: &Candidate<'_>) -> Option<Rejection> {
    check_leading_command(c.normalized)
}

fn forbidden_keywords(c: &Candidate<'_>) -> Option<Rejection> {
    check_forbidden_keywords(c.normalized)
}

fn dangerous_patterns(c: &Candidate<'_>) -> Option<Rejection> {
    check_dangerous_patterns(c.normalized)
}

fn injection_patterns(c: &Candidate<'_>) -> Option<Rejection> {
    check_injection_patterns(c.normalized)
}

// The statement count looks at the raw text: normalization drops trailing terminators.
fn statement_count(c: &Candidate<'_>) -> Option<Rejection> {
    check_single_statement(c.raw)
}

const CHECKS: [(CheckStage, Check); 5] = [
    (CheckStage::LeadingCommand, leading_command),
    (CheckStage::ForbiddenKeywords, forbidden_keywords),
    (CheckStage::DangerousPatterns, dangerous_patterns),
    (CheckStage::InjectionPatterns, injection_patterns),
    (CheckStage::StatementCount, statement_count),
];

/// SQL query validator.
///
/// Stateless; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlValidator;

impl SqlValidator {
    pub fn new() -> Self {
        Self
    }

    /// Stages in execution order. The first failing stage decides the reason.
    pub fn check_order() -> [CheckStage; 5] {
        CHECKS.map(|(stage, _)| stage)
    }

    /// Validate a SQL query.
    pub fn validate(&self, query: &str) -> Verdict {
        debug!(
            "Validating query: {}",
            query.chars().take(100).collect::<String>()
        );

        let normalized = NormalizedQuery::new(query);
        if normalized.is_empty() {
            return Rejection::new(ReasonCode::EmptyOrInvalid, "Empty or invalid SQL query").into();
        }

        let candidate = Candidate {
            raw: query,
            normalized: &normalized,
        };

        for (stage, check) in CHECKS {
            if let Some(rejection) = check(&candidate) {
                debug!("Query rejected at stage {:?}", stage);
                return rejection.into();
            }
        }

        debug!("Query validation passed");
        Verdict::safe(self.sanitize(query))
    }

    /// Sanitize a query (basic cleanup).
    ///
    /// Removes comments, trailing semicolons, and normalizes whitespace while
    /// keeping the original casing.
    pub fn sanitize(&self, query: &str) -> String {
        let sanitized = COMMENT_REGEX.replace_all(query.trim(), "");
        let sanitized = BLOCK_COMMENT_REGEX.replace_all(&sanitized, "");
        let sanitized = collapse_whitespace(&sanitized);
        strip_terminators(&sanitized).to_string()
    }
}

/// Validate with the default validator.
pub fn validate(query: &str) -> Verdict {
    SqlValidator::new().validate(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::classifier::Command;

    const TABLE_QUERIES: [&str; 4] = [
        "SELECT * FROM freelancer_earnings LIMIT 10",
        "SELECT COUNT(*) FROM freelancer_earnings WHERE Experience_Level = 'Expert'",
        "SELECT Platform, AVG(Earnings_USD) FROM freelancer_earnings GROUP BY Platform",
        "WITH top_earners AS (SELECT * FROM freelancer_earnings ORDER BY Earnings_USD DESC LIMIT 10) SELECT * FROM top_earners",
    ];

    #[test]
    fn test_valid_select() {
        let validator = SqlValidator::new();
        for sql in TABLE_QUERIES {
            let verdict = validator.validate(sql);
            assert_eq!(verdict, Verdict::safe(sql), "{sql}");
        }
    }

    #[test]
    fn test_safe_query_is_cleaned() {
        let verdict = validate("  SELECT Platform\n   FROM freelancer_earnings ;\n");
        assert_eq!(
            verdict.cleaned_query(),
            Some("SELECT Platform FROM freelancer_earnings")
        );
    }

    #[test]
    fn test_empty_or_invalid() {
        for sql in ["", "   ", "\n\t", ";", " ; ; "] {
            assert_eq!(
                validate(sql).reason(),
                Some(ReasonCode::EmptyOrInvalid),
                "{sql:?}"
            );
        }
    }

    #[test]
    fn test_disallowed_leading_command() {
        let verdict = validate("DROP TABLE freelancer_earnings");
        assert_eq!(
            verdict,
            Verdict::Unsafe {
                reason: ReasonCode::DisallowedLeadingCommand,
                detail: "Modifying operation is not allowed: DROP".into(),
            }
        );

        for sql in [
            "DELETE FROM freelancer_earnings WHERE id = 1",
            "INSERT INTO freelancer_earnings VALUES (1, 'test')",
            "UPDATE freelancer_earnings SET Earnings_USD = 0",
            "CREATE TABLE test (id INT)",
            "ALTER TABLE freelancer_earnings ADD COLUMN test VARCHAR(100)",
            "PRAGMA table_info(freelancer_earnings)",
            "SHOW TABLES",
        ] {
            assert_eq!(
                validate(sql).reason(),
                Some(ReasonCode::DisallowedLeadingCommand),
                "{sql}"
            );
        }
    }

    #[test]
    fn test_chained_drop_reports_keyword_first() {
        let verdict =
            validate("SELECT * FROM freelancer_earnings; DROP TABLE freelancer_earnings;");
        assert_eq!(
            verdict.reason(),
            Some(ReasonCode::ForbiddenKeyword(Command::Drop))
        );
    }

    #[test]
    fn test_multiple_read_statements() {
        let verdict = validate("SELECT * FROM freelancer_earnings; SELECT 1");
        assert_eq!(verdict.reason(), Some(ReasonCode::MultipleStatements));
    }

    #[test]
    fn test_tautology_injection() {
        let verdict = validate("SELECT * FROM freelancer_earnings WHERE id = 1 OR 1=1");
        assert_eq!(verdict.reason(), Some(ReasonCode::InjectionPattern));
    }

    #[test]
    fn test_system_catalog() {
        let verdict = validate("SELECT * FROM sqlite_master");
        assert_eq!(verdict.reason(), Some(ReasonCode::DangerousPattern));
    }

    #[test]
    fn test_comment_truncation() {
        let verdict = validate("SELECT * FROM freelancer_earnings WHERE name = 'test'; --");
        assert_eq!(verdict.reason(), Some(ReasonCode::DangerousPattern));
    }

    #[test]
    fn test_quote_terminator_injection() {
        let verdict = validate("SELECT * FROM t WHERE name = 'x'; SELECT 1");
        assert_eq!(verdict.reason(), Some(ReasonCode::InjectionPattern));
    }

    #[test]
    fn test_check_order() {
        assert_eq!(
            SqlValidator::check_order(),
            [
                CheckStage::LeadingCommand,
                CheckStage::ForbiddenKeywords,
                CheckStage::DangerousPatterns,
                CheckStage::InjectionPatterns,
                CheckStage::StatementCount,
            ]
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // Leading command beats everything that follows
        assert_eq!(
            validate("DELETE FROM t -- OR 1=1").reason(),
            Some(ReasonCode::DisallowedLeadingCommand)
        );
        // Keyword beats comment
        assert_eq!(
            validate("SELECT 1 /* */ UNION SELECT 1 FROM (DELETE FROM t)").reason(),
            Some(ReasonCode::ForbiddenKeyword(Command::Delete))
        );
        // Comment beats tautology
        assert_eq!(
            validate("SELECT * FROM t WHERE a = 1 OR 1=1 --").reason(),
            Some(ReasonCode::DangerousPattern)
        );
    }

    #[test]
    fn test_sanitize() {
        let validator = SqlValidator::new();
        let sanitized = validator.sanitize("SELECT * FROM users;  -- comment\n");
        assert_eq!(sanitized, "SELECT * FROM users");

        let sanitized2 = validator.sanitize("SELECT  *   FROM   users /* block */");
        assert_eq!(sanitized2, "SELECT * FROM users");

        let sanitized3 = validator.sanitize("select /* a\nb */ name\nfrom Users");
        assert_eq!(sanitized3, "select name from Users");
    }

    #[test]
    fn test_validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqlValidator>();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    validate(&format!("SELECT * FROM t LIMIT {}", i)).is_safe()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
