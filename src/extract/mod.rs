//! Extraction of candidate SQL from free-form model responses.

use crate::security::normalizer::strip_terminators;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code block, optionally tagged `sql`.
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```(?:sql)?\s*(.*?)\s*```").expect("Invalid regex: code block pattern")
});

/// Bare statements tried in priority order when no code block is present.
static STATEMENT_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["SELECT", "INSERT", "UPDATE", "DELETE"]
        .iter()
        .map(|keyword| {
            Regex::new(&format!(r"(?is)(\b{keyword}\b.*?)(?:;|$)"))
                .expect("Invalid regex: bare statement pattern")
        })
        .collect()
});

/// Pull the SQL text out of a model response.
///
/// Mutating statements are extracted too; rejecting them is the validator's job.
pub fn extract_sql(response: &str) -> Option<String> {
    let captured = CODE_BLOCK_REGEX
        .captures(response)
        .or_else(|| {
            STATEMENT_REGEXES
                .iter()
                .find_map(|regex| regex.captures(response))
        })?
        .get(1)?
        .as_str();

    let sql = strip_terminators(captured.trim());
    (!sql.is_empty()).then(|| sql.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_sql_block() {
        let response = "Here is the query:\n```sql\nSELECT * FROM freelancer_earnings\nLIMIT 10;\n```\nIt returns ten rows.";
        assert_eq!(
            extract_sql(response).as_deref(),
            Some("SELECT * FROM freelancer_earnings\nLIMIT 10")
        );
    }

    #[test]
    fn test_untagged_block() {
        let response = "```\nselect count(*) from t\n```";
        assert_eq!(extract_sql(response).as_deref(), Some("select count(*) from t"));
    }

    #[test]
    fn test_block_tag_case_insensitive() {
        let response = "```SQL\nSELECT 1;\n```";
        assert_eq!(extract_sql(response).as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn test_bare_statement() {
        let response = "The answer is SELECT Platform FROM freelancer_earnings; hope it helps";
        assert_eq!(
            extract_sql(response).as_deref(),
            Some("SELECT Platform FROM freelancer_earnings")
        );

        let response = "Use: select avg(Hourly_Rate) from freelancer_earnings";
        assert_eq!(
            extract_sql(response).as_deref(),
            Some("select avg(Hourly_Rate) from freelancer_earnings")
        );
    }

    #[test]
    fn test_select_takes_priority() {
        let response = "DELETE FROM t; then SELECT * FROM t;";
        assert_eq!(extract_sql(response).as_deref(), Some("SELECT * FROM t"));

        let response = "You could run DELETE FROM t WHERE id = 3";
        assert_eq!(
            extract_sql(response).as_deref(),
            Some("DELETE FROM t WHERE id = 3")
        );
    }

    #[test]
    fn test_keyword_inside_word_ignored() {
        assert_eq!(extract_sql("I preselected nothing"), None);
    }

    #[test]
    fn test_no_sql() {
        assert_eq!(extract_sql("I cannot answer that question."), None);
        assert_eq!(extract_sql("```sql\n;\n```"), None);
    }
}
