//! Error types for storage operations.

use thiserror::Error;

/// A specialized Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The error type for storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record of the given kind under the given id.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("investment", "cashflow", "notification").
        entity: &'static str,
        /// The requested id.
        id: String,
    },

    /// The backend failed.
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
