//! Error types for workflow transitions.

use thiserror::Error;

/// A specialized Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// The error type for status-machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A requested status change is not in the transition table.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

impl WorkflowError {
    /// Creates an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
