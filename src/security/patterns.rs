//! Forbidden keyword, dangerous pattern and injection idiom detection.
//!
//! Each scan is a separate check so the validator can order them. All scans
//! run on the normalized upper-case text and the regexes are case-insensitive,
//! so they also work on raw input.

use crate::security::classifier::Command;
use crate::security::normalizer::NormalizedQuery;
use crate::security::verdict::{ReasonCode, Rejection};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// A compiled signature with a short description used in rejection details.
pub struct PatternRule {
    pub regex: Regex,
    pub description: &'static str,
}

impl PatternRule {
    fn new(pattern: &str, description: &'static str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex: pattern rule"),
            description,
        }
    }
}

/// Structural abuse signatures.
/// All patterns are compile-time constants, so a failure here is a bug caught by tests.
pub static DANGEROUS_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(
            r"(?i);\s*(DROP|DELETE|UPDATE|INSERT|CREATE|ALTER)\b",
            "statement chained after terminator",
        ),
        PatternRule::new(r"--", "line comment"),
        PatternRule::new(r"/\*", "block comment"),
        PatternRule::new(
            r"(?is)UNION\s+ALL\s+SELECT.*FROM\s+SQLITE_MASTER",
            "schema extraction through UNION",
        ),
        PatternRule::new(r"(?i)SQLITE_MASTER", "system catalog sqlite_master"),
        PatternRule::new(r"(?i)SQLITE_SEQUENCE", "system catalog sqlite_sequence"),
        PatternRule::new(r"(?i)SQLITE_TEMP_MASTER", "system catalog sqlite_temp_master"),
        PatternRule::new(r"(?i)LOAD_EXTENSION", "extension loading"),
        PatternRule::new(r"(?i)\bRANDOMBLOB\s*\(", "randomblob() call"),
        PatternRule::new(r"(?i)\bHEX\s*\(", "hex() call"),
        PatternRule::new(r"(?i)\bCHAR\s*\(", "char() call"),
    ]
});

/// Classic injection idioms.
pub static INJECTION_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule::new(r#"['"]\s*;"#, "quote followed by terminator"),
        PatternRule::new(r"(?i)'\s*(OR|AND)\s*'", "quoted boolean injection"),
        PatternRule::new(r#"(?i)"\s*(OR|AND)\s*""#, "double-quoted boolean injection"),
        PatternRule::new(r"(?i)\bOR\s+TRUE\b", "OR TRUE tautology"),
    ]
});

/// `OR <a> = <b>`, optionally parenthesized; a tautology when both operands
/// are the same token. Operands include dots so `1.5` and `t.id` stay whole.
static TAUTOLOGY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bOR\b\s*\(?\s*['"]?([\w.]+)['"]?\s*=\s*['"]?([\w.]+)['"]?"#)
        .expect("Invalid regex: tautology pattern")
});

/// Find the first deny-list keyword present as a whole word.
///
/// Words are runs of alphanumerics and `_`, so `CREATED_AT` does not match
/// `CREATE`. Keywords are tried in deny-list order.
pub fn find_forbidden_keyword(upper_query: &str) -> Option<Command> {
    let words: HashSet<&str> = upper_query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| !s.is_empty())
        .collect();

    Command::DENY_LIST
        .iter()
        .find(|command| words.contains(command.keyword()))
        .copied()
}

/// Description of the first dangerous pattern matching `query`.
pub fn find_dangerous_pattern(query: &str) -> Option<&'static str> {
    DANGEROUS_PATTERNS
        .iter()
        .find(|rule| rule.regex.is_match(query))
        .map(|rule| rule.description)
}

/// Description of the first injection idiom matching `query`.
pub fn find_injection_pattern(query: &str) -> Option<&'static str> {
    if let Some(rule) = INJECTION_PATTERNS
        .iter()
        .find(|rule| rule.regex.is_match(query))
    {
        return Some(rule.description);
    }

    let tautology = TAUTOLOGY_REGEX
        .captures_iter(query)
        .any(|caps| caps[1].eq_ignore_ascii_case(&caps[2]));
    tautology.then_some("OR tautology")
}

pub fn check_forbidden_keywords(query: &NormalizedQuery) -> Option<Rejection> {
    let command = find_forbidden_keyword(query.upper())?;
    warn!("Forbidden keyword detected: {}", command);
    Some(Rejection::new(
        ReasonCode::ForbiddenKeyword(command),
        format!("Forbidden operation detected: {}", command),
    ))
}

pub fn check_dangerous_patterns(query: &NormalizedQuery) -> Option<Rejection> {
    let description = find_dangerous_pattern(query.upper())?;
    warn!("Dangerous pattern detected: {}", description);
    Some(Rejection::new(
        ReasonCode::DangerousPattern,
        format!("Potentially dangerous pattern detected: {}", description),
    ))
}

pub fn check_injection_patterns(query: &NormalizedQuery) -> Option<Rejection> {
    let description = find_injection_pattern(query.upper())?;
    warn!("SQL injection pattern detected: {}", description);
    Some(Rejection::new(
        ReasonCode::InjectionPattern,
        format!("SQL injection attempt detected: {}", description),
    ))
}
