//! Error types for rule evaluation.

use thiserror::Error;

/// A specialized Result type for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// The error type for rule evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No rule registered under the given id.
    #[error("Unknown rule: {id}")]
    UnknownRule {
        /// The requested rule id.
        id: String,
    },

    /// A rule predicate failed to evaluate.
    #[error("Rule {rule} failed: {reason}")]
    Evaluation {
        /// The failing rule's id.
        rule: String,
        /// Description of the failure.
        reason: String,
    },
}

impl RuleError {
    /// Creates an unknown rule error.
    #[must_use]
    pub fn unknown_rule(id: impl Into<String>) -> Self {
        Self::UnknownRule { id: id.into() }
    }

    /// Creates an evaluation error.
    #[must_use]
    pub fn evaluation(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Evaluation {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
