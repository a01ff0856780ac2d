//! # Capflow Schedule
//!
//! Deterministic expansion of declarative payment structures into cashflow
//! schedules.
//!
//! - [`calculator`]: pure functions turning each payment-structure shape
//!   into an ordered list of cashflow drafts, plus sum reconciliation
//! - [`generator`]: selects the expansion strategy from an investment's
//!   financing type, assigns the correct initial cashflow status, and
//!   reports warnings
//!
//! ## Example
//!
//! ```rust
//! use capflow_core::prelude::*;
//! use capflow_schedule::calculator;
//! use rust_decimal_macros::dec;
//!
//! let lease = LeaseSchedule::new(dec!(500), 24, Date::parse("2026-01-01").unwrap());
//! let drafts = calculator::expand_lease_schedule(&lease).unwrap();
//! assert_eq!(drafts.len(), 24);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod calculator;
pub mod error;
pub mod generator;

pub use calculator::{CashflowDraft, SumCheck, DEFAULT_TOLERANCE_PERCENT};
pub use error::{ScheduleError, ScheduleResult};
pub use generator::Generated;
