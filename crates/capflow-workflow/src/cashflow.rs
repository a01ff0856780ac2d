//! Cashflow confirmation status machine.

use capflow_core::types::{CashflowStatus, InvestmentStatus};

use crate::error::{WorkflowError, WorkflowResult};

/// Returns the statuses reachable from `from`.
#[must_use]
pub fn transitions(from: CashflowStatus) -> &'static [CashflowStatus] {
    use CashflowStatus::*;
    match from {
        Planned => &[Outstanding, Cancelled],
        Outstanding => &[PreConfirmed, Postponed, Cancelled],
        // The confirming executive may send a cashflow back to the manager.
        PreConfirmed => &[Confirmed, Outstanding],
        Postponed => &[Outstanding, Cancelled],
        Confirmed => &[],
        Cancelled => &[],
    }
}

/// Returns true iff `to` is reachable from `from`.
#[must_use]
pub fn can_transition(from: CashflowStatus, to: CashflowStatus) -> bool {
    transitions(from).contains(&to)
}

/// Validates and applies a transition.
///
/// # Errors
///
/// Returns `WorkflowError::InvalidTransition` if the transition is not in
/// the table.
pub fn transition(from: CashflowStatus, to: CashflowStatus) -> WorkflowResult<CashflowStatus> {
    if can_transition(from, to) {
        log::debug!("cashflow status {from} -> {to}");
        Ok(to)
    } else {
        Err(WorkflowError::invalid_transition(from, to))
    }
}

/// Returns true if the status has no outgoing transitions.
#[must_use]
pub fn is_final(status: CashflowStatus) -> bool {
    transitions(status).is_empty()
}

/// Maps an investment's lifecycle status to the starting status of its
/// cashflows.
///
/// This is the single authoritative mapping; the generator and every other
/// caller must go through it rather than re-deriving the status locally.
#[must_use]
pub fn initial_status_for(investment_status: InvestmentStatus) -> CashflowStatus {
    match investment_status {
        InvestmentStatus::Draft | InvestmentStatus::Submitted | InvestmentStatus::Rejected => {
            CashflowStatus::Planned
        }
        InvestmentStatus::Approved | InvestmentStatus::Active => CashflowStatus::Outstanding,
        InvestmentStatus::Completed => CashflowStatus::Cancelled,
    }
}
