//! Investment lifecycle status machine.

use capflow_core::types::InvestmentStatus;

use crate::error::{WorkflowError, WorkflowResult};

/// Returns the statuses reachable from `from`.
///
/// This table is authoritative: a transition is legal iff the target is
/// listed here.
#[must_use]
pub fn transitions(from: InvestmentStatus) -> &'static [InvestmentStatus] {
    use InvestmentStatus::*;
    match from {
        Draft => &[Submitted],
        Submitted => &[Approved, Rejected],
        Approved => &[Active],
        Rejected => &[Draft],
        Active => &[Completed],
        Completed => &[],
    }
}

/// Returns true iff `to` is reachable from `from`.
#[must_use]
pub fn can_transition(from: InvestmentStatus, to: InvestmentStatus) -> bool {
    transitions(from).contains(&to)
}

/// Validates and applies a transition.
///
/// # Errors
///
/// Returns `WorkflowError::InvalidTransition` if the transition is not in
/// the table. Invalid requests are always rejected, never silently ignored.
pub fn transition(from: InvestmentStatus, to: InvestmentStatus) -> WorkflowResult<InvestmentStatus> {
    if can_transition(from, to) {
        log::debug!("investment status {from} -> {to}");
        Ok(to)
    } else {
        Err(WorkflowError::invalid_transition(from, to))
    }
}

/// Returns true if the status has no outgoing transitions.
#[must_use]
pub fn is_final(status: InvestmentStatus) -> bool {
    transitions(status).is_empty()
}
