//! Orchestration engine for the Capflow investment approval workflow.
//!
//! The [`Engine`] ties the layers together: it authorizes actions through
//! the workflow guards, advances the status machines, (re)generates
//! cashflow schedules, runs the notification rules, and persists every
//! outcome through the storage traits. It is the single writer; nothing
//! else mutates stored records.

#![warn(missing_docs)]

pub mod clock;
pub mod directory;
pub mod engine;
pub mod error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::Directory;
pub use engine::{Engine, Outcome};
pub use error::{EngineError, EngineResult};
