//! Persistence layer for the Capflow investment workflow.
//!
//! This crate defines the storage traits the engine writes through
//! ([`InvestmentStore`], [`CashflowStore`], [`NotificationStore`]), typed
//! filters for querying, and an in-memory implementation ([`MemoryStore`])
//! used in tests and single-process deployments. Durable backends are
//! extensions implementing the same traits.

#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filter::{CashflowFilter, InvestmentFilter, NotificationFilter};
pub use memory::MemoryStore;
pub use traits::{CashflowStore, InvestmentStore, NotificationStore, Stores};
