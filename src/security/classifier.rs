//! Leading-command classification against the read-only allow-list.

use crate::security::normalizer::NormalizedQuery;
use crate::security::verdict::{ReasonCode, Rejection};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Broad effect of a SQL command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    ReadOnly,
    Definition,
    Modification,
    Administrative,
    System,
    Execution,
}

impl CommandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadOnly => "Read-only",
            Self::Definition => "Data definition",
            Self::Modification => "Data modification",
            Self::Administrative => "Administrative",
            Self::System => "System",
            Self::Execution => "Execution",
        }
    }
}

/// Every command the classifier knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Select,
    With,
    Union,
    Intersect,
    Except,
    Drop,
    Create,
    Alter,
    Truncate,
    Rename,
    Insert,
    Update,
    Delete,
    Replace,
    Merge,
    Grant,
    Revoke,
    Commit,
    Rollback,
    Savepoint,
    Pragma,
    Attach,
    Detach,
    Vacuum,
    Reindex,
    Exec,
    Execute,
    Call,
}

impl Command {
    /// Commands allowed to lead a statement.
    pub const ALLOW_LIST: [Command; 5] = [
        Self::Select,
        Self::With,
        Self::Union,
        Self::Intersect,
        Self::Except,
    ];

    /// Commands rejected wherever they appear. Order decides which keyword is
    /// reported when several are present.
    pub const DENY_LIST: [Command; 23] = [
        Self::Drop,
        Self::Create,
        Self::Alter,
        Self::Truncate,
        Self::Rename,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Replace,
        Self::Merge,
        Self::Grant,
        Self::Revoke,
        Self::Commit,
        Self::Rollback,
        Self::Savepoint,
        Self::Pragma,
        Self::Attach,
        Self::Detach,
        Self::Vacuum,
        Self::Reindex,
        Self::Exec,
        Self::Execute,
        Self::Call,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::With => "WITH",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Drop => "DROP",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Truncate => "TRUNCATE",
            Self::Rename => "RENAME",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
            Self::Merge => "MERGE",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Savepoint => "SAVEPOINT",
            Self::Pragma => "PRAGMA",
            Self::Attach => "ATTACH",
            Self::Detach => "DETACH",
            Self::Vacuum => "VACUUM",
            Self::Reindex => "REINDEX",
            Self::Exec => "EXEC",
            Self::Execute => "EXECUTE",
            Self::Call => "CALL",
        }
    }

    pub fn category(&self) -> CommandCategory {
        match self {
            Self::Select | Self::With | Self::Union | Self::Intersect | Self::Except => {
                CommandCategory::ReadOnly
            }
            Self::Drop | Self::Create | Self::Alter | Self::Truncate | Self::Rename => {
                CommandCategory::Definition
            }
            Self::Insert | Self::Update | Self::Delete | Self::Replace | Self::Merge => {
                CommandCategory::Modification
            }
            Self::Grant | Self::Revoke | Self::Commit | Self::Rollback | Self::Savepoint => {
                CommandCategory::Administrative
            }
            Self::Pragma | Self::Attach | Self::Detach | Self::Vacuum | Self::Reindex => {
                CommandCategory::System
            }
            Self::Exec | Self::Execute | Self::Call => CommandCategory::Execution,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.category() == CommandCategory::ReadOnly
    }

    /// Parse an upper-case keyword.
    pub fn parse(keyword: &str) -> Option<Self> {
        Self::ALLOW_LIST
            .iter()
            .chain(Self::DENY_LIST.iter())
            .find(|c| c.keyword() == keyword)
            .copied()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Accept the query only if its leading command is on the allow-list.
pub fn check_leading_command(query: &NormalizedQuery) -> Option<Rejection> {
    let token = query.leading_token().unwrap_or_default();

    match Command::parse(token) {
        Some(command) if command.is_read_only() => None,
        Some(command) => {
            warn!("Disallowed leading command: {}", command);
            Some(Rejection::new(
                ReasonCode::DisallowedLeadingCommand,
                format!("Modifying operation is not allowed: {}", command),
            ))
        }
        None => {
            warn!("Unrecognized leading command: {}", token);
            Some(Rejection::new(
                ReasonCode::DisallowedLeadingCommand,
                format!("Unrecognized SQL command: {}", token),
            ))
        }
    }
}
