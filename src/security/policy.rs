//! Human-readable summary of the validation rules.

use crate::security::classifier::{Command, CommandCategory};
use std::fmt::Write;

const FORBIDDEN_GROUPS: [CommandCategory; 5] = [
    CommandCategory::Modification,
    CommandCategory::Definition,
    CommandCategory::Administrative,
    CommandCategory::System,
    CommandCategory::Execution,
];

const RESTRICTIONS: [&str; 5] = [
    "Only a single statement per query",
    "SQL comments (-- and /* */) are rejected",
    "System catalog tables and extension loading are blocked",
    "Byte and character manipulation functions (hex, char, randomblob) are blocked",
    "Classic injection idioms (quote tricks, OR 1=1, OR TRUE) are blocked",
];

fn keywords(category: CommandCategory) -> String {
    Command::ALLOW_LIST
        .iter()
        .chain(Command::DENY_LIST.iter())
        .filter(|c| c.category() == category)
        .map(Command::keyword)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Describe what the validator allows and rejects.
pub fn policy_summary() -> String {
    let mut out = String::from("SQL security rules (read-only mode)\n\nAllowed commands:\n");
    let _ = writeln!(out, "  {}", keywords(CommandCategory::ReadOnly));

    out.push_str("\nForbidden commands:\n");
    for category in FORBIDDEN_GROUPS {
        let _ = writeln!(out, "  {}: {}", category.label(), keywords(category));
    }

    out.push_str("\nAdditional restrictions:\n");
    for restriction in RESTRICTIONS {
        let _ = writeln!(out, "  - {}", restriction);
    }
    out
}
