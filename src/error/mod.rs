//! Error types for the SQL guard.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.
//! Rejected queries are not errors inside the engine: they surface as
//! [`Verdict::Unsafe`](crate::security::Verdict) and only become a
//! [`SecurityError`] when a caller asks for a `Result`.

use crate::security::ReasonCode;
use std::borrow::Cow;
use thiserror::Error;

/// Main error type for the SQL guard.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Query rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("Query rejected ({reason}): {detail}")]
    Rejected { reason: ReasonCode, detail: String },
}

impl SecurityError {
    /// The rule that rejected the query.
    pub fn reason(&self) -> &ReasonCode {
        match self {
            Self::Rejected { reason, .. } => reason,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(Cow<'static, str>),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    #[error("Cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// Evaluation corpus errors.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Evaluation corpus is empty")]
    EmptyCorpus,

    #[error("Duplicate test case id: {0}")]
    DuplicateCase(u32),
}

/// Result type alias for GuardError.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Result type alias for SecurityError.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Command;

    #[test]
    fn test_rejection_display() {
        let err = SecurityError::Rejected {
            reason: ReasonCode::ForbiddenKeyword(Command::Drop),
            detail: "Forbidden operation detected: DROP".into(),
        };
        assert_eq!(
            err.to_string(),
            "Query rejected (forbidden keyword DROP): Forbidden operation detected: DROP"
        );
        assert_eq!(err.reason(), &ReasonCode::ForbiddenKeyword(Command::Drop));
    }

    #[test]
    fn test_error_conversion() {
        let config_error = ConfigError::MissingField("table_name".into());
        let guard_error: GuardError = config_error.into();
        assert!(matches!(guard_error, GuardError::Config(_)));

        let security_error = SecurityError::Rejected {
            reason: ReasonCode::MultipleStatements,
            detail: "x".into(),
        };
        let guard_error: GuardError = security_error.into();
        assert!(matches!(guard_error, GuardError::Security(_)));
    }
}
