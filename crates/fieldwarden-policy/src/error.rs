//! Policy-layer error types.

use fieldwarden_core::PolicyError;
use thiserror::Error;

/// A malformed validation rule expression.
///
/// Expressions are parsed when a definition is registered, so these
/// reach operators at configuration time, never callers at request
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unknown validation rule `{0}`")]
    UnknownRule(String),

    #[error("rule `{0}` requires an argument")]
    MissingArgument(&'static str),

    #[error("invalid argument `{arg}` for rule `{rule}`")]
    InvalidArgument { rule: &'static str, arg: String },
}

impl From<RuleError> for PolicyError {
    fn from(err: RuleError) -> Self {
        // A registered definition never fails to parse; hitting this at
        // request time means a handler passed malformed override rules.
        PolicyError::Internal(err.to_string())
    }
}
