//! Multi-statement guard.

use crate::security::normalizer::TERMINATOR;
use crate::security::verdict::{ReasonCode, Rejection};
use tracing::warn;

/// Count non-empty statements, splitting naively on the terminator.
///
/// Terminators inside string literals are counted too.
pub fn count_statements(raw: &str) -> usize {
    raw.split(TERMINATOR)
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

/// Reject input carrying more than one statement. Runs on the raw text.
pub fn check_single_statement(raw: &str) -> Option<Rejection> {
    let count = count_statements(raw);
    if count > 1 {
        warn!("Multiple statements detected: {}", count);
        return Some(Rejection::new(
            ReasonCode::MultipleStatements,
            format!("Multiple SQL statements are not allowed (found {})", count),
        ));
    }
    None
}
