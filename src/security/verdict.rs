//! Validation outcome types.

use crate::error::{SecurityError, SecurityResult};
use crate::security::classifier::Command;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a query was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    EmptyOrInvalid,
    DisallowedLeadingCommand,
    ForbiddenKeyword(Command),
    DangerousPattern,
    MultipleStatements,
    InjectionPattern,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOrInvalid => f.write_str("empty or invalid"),
            Self::DisallowedLeadingCommand => f.write_str("disallowed leading command"),
            Self::ForbiddenKeyword(command) => write!(f, "forbidden keyword {}", command),
            Self::DangerousPattern => f.write_str("dangerous pattern"),
            Self::MultipleStatements => f.write_str("multiple statements"),
            Self::InjectionPattern => f.write_str("injection pattern"),
        }
    }
}

/// A failed check: the rule and a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: ReasonCode,
    pub detail: String,
}

impl Rejection {
    pub fn new(reason: ReasonCode, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Result of validating one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Query may be executed; `cleaned_query` is the text to run.
    Safe { cleaned_query: String },
    Unsafe { reason: ReasonCode, detail: String },
}

impl Verdict {
    pub fn safe(cleaned_query: impl Into<String>) -> Self {
        Self::Safe {
            cleaned_query: cleaned_query.into(),
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe { .. })
    }

    pub fn cleaned_query(&self) -> Option<&str> {
        match self {
            Self::Safe { cleaned_query } => Some(cleaned_query),
            Self::Unsafe { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Safe { .. } => None,
            Self::Unsafe { reason, .. } => Some(*reason),
        }
    }

    /// Convert into a `Result` for callers that propagate rejections with `?`.
    pub fn into_result(self) -> SecurityResult<String> {
        match self {
            Self::Safe { cleaned_query } => Ok(cleaned_query),
            Self::Unsafe { reason, detail } => Err(SecurityError::Rejected { reason, detail }),
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        Self::Unsafe {
            reason: rejection.reason,
            detail: rejection.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_verdict() {
        let verdict = Verdict::safe("SELECT 1");
        assert!(verdict.is_safe());
        assert_eq!(verdict.cleaned_query(), Some("SELECT 1"));
        assert_eq!(verdict.reason(), None);
        assert_eq!(verdict.into_result().unwrap(), "SELECT 1");
    }

    #[test]
    fn test_unsafe_verdict_into_result() {
        let verdict: Verdict =
            Rejection::new(ReasonCode::MultipleStatements, "Multiple SQL statements are not allowed")
                .into();
        assert!(!verdict.is_safe());
        assert_eq!(verdict.reason(), Some(ReasonCode::MultipleStatements));

        let err = verdict.into_result().unwrap_err();
        assert_eq!(err.reason(), &ReasonCode::MultipleStatements);
    }

    #[test]
    fn test_verdict_json_shape() {
        let verdict = Verdict::Unsafe {
            reason: ReasonCode::ForbiddenKeyword(Command::Delete),
            detail: "Forbidden operation detected: DELETE".into(),
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "unsafe");
        assert_eq!(json["reason"]["forbidden_keyword"], "DELETE");

        let safe = serde_json::to_value(Verdict::safe("SELECT 1")).unwrap();
        assert_eq!(safe["status"], "safe");
        assert_eq!(safe["cleaned_query"], "SELECT 1");
    }
}
