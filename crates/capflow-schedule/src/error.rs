//! Error types for schedule generation.

use capflow_core::error::CoreError;
use capflow_core::types::FinancingType;
use thiserror::Error;

/// A specialized Result type for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// The error type for schedule generation.
///
/// These are the fatal generation failures: no partial cashflow set is ever
/// produced alongside one of them. A sum-reconciliation mismatch is *not* an
/// error; it is reported in the generation outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The investment has no payment structure to expand.
    #[error("No payment structure present for financing type {financing_type}")]
    MissingStructure {
        /// The investment's financing type.
        financing_type: FinancingType,
    },

    /// The payment-structure variant does not match the financing type.
    #[error("Payment structure shape does not match financing type {financing_type}")]
    StructureMismatch {
        /// The investment's financing type.
        financing_type: FinancingType,
    },

    /// A structure or date error from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScheduleError::StructureMismatch {
            financing_type: FinancingType::Lease,
        };
        assert!(err.to_string().contains("Lease"));
    }
}
