//! Error types for engine operations.

use thiserror::Error;

use capflow_rules::error::RuleError;
use capflow_schedule::error::ScheduleError;
use capflow_store::error::StoreError;
use capflow_workflow::error::WorkflowError;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// The error type for engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A guard denied the action.
    #[error("Denied: {reason}")]
    Denied {
        /// The guard's denial reason.
        reason: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The requested id.
        id: String,
    },

    /// The investment references a company the directory does not know.
    #[error("Unknown company: {id}")]
    UnknownCompany {
        /// The unresolved company id.
        id: String,
    },

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Schedule generation failure.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Status machine violation.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Rule evaluation failure.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl EngineError {
    /// Creates a denial error from a guard reason.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
