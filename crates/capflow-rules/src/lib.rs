//! # Capflow Rules
//!
//! Notification rule engine: decouples "what happened" from "who should be
//! told and how".
//!
//! A [`rule::BusinessRule`] bundles a trigger category (daily vs. event), a
//! notification kind and priority, a predicate over a [`context::RuleContext`],
//! a recipient resolver, and a message formatter. The [`engine::RuleEngine`]
//! runs registered rules against a context and fans out one notification per
//! resolved recipient.
//!
//! A single failing rule never aborts evaluation of the rest: failures are
//! logged per rule and skipped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod builtin;
pub mod context;
pub mod engine;
pub mod error;
pub mod rule;

pub use context::RuleContext;
pub use engine::{already_notified_today, RuleEngine};
pub use error::{RuleError, RuleResult};
pub use rule::{BusinessRule, RuleMatch, RuleMessage, RuleTrigger};
