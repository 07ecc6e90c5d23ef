//! SQL safety checks: normalization, command classification, pattern
//! detection and the validation facade.

pub mod classifier;
pub mod normalizer;
pub mod patterns;
pub mod policy;
pub mod statements;
pub mod validator;
pub mod verdict;

pub use classifier::{Command, CommandCategory};
pub use normalizer::{NormalizedQuery, normalize};
pub use policy::policy_summary;
pub use validator::{CheckStage, SqlValidator, validate};
pub use verdict::{ReasonCode, Rejection, Verdict};
