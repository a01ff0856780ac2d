//! # Capflow Workflow
//!
//! Status machines and transition guards for the Capflow approval workflow.
//!
//! Two independent finite-state machines govern the lifecycles:
//!
//! - [`investment`]: `draft → submitted → {approved, rejected}`,
//!   `approved → active → completed`, `rejected → draft`
//! - [`cashflow`]: the two-step confirmation flow
//!   (`outstanding → pre_confirmed → confirmed`) plus postponement and
//!   cancellation
//!
//! The machines check *shape* validity only. [`guards`] is the single place
//! where *who* may do *what under which conditions* is decided: role tables,
//! per-action business invariants, and edit/delete/view permissions. Guards
//! return a structured [`guards::GuardDecision`] rather than erroring, so
//! callers can surface denial reasons directly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod cashflow;
pub mod error;
pub mod guards;
pub mod investment;

pub use error::{WorkflowError, WorkflowResult};
pub use guards::{CashflowAction, GuardDecision, InvestmentAction};
