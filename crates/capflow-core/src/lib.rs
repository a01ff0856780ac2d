//! # Capflow Core
//!
//! Core domain types for the Capflow capital-investment workflow library.
//!
//! This crate provides the foundational building blocks used throughout
//! Capflow:
//!
//! - **Types**: Domain-specific types like `Date`, `Investment`, `Cashflow`
//! - **Payment structures**: A closed union over the three financing shapes
//! - **Roles**: Role assignments and the directory records guards and rules
//!   evaluate against
//! - **Errors**: Structured error types shared by the workflow crates
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: Newtypes prevent mixing incompatible identifiers
//! - **Closed Unions**: Payment structures are tagged enums, so a shape
//!   mismatch is a compile-time concern wherever possible
//! - **Explicit Over Implicit**: No global state; actors and clocks are
//!   always passed in
//!
//! ## Example
//!
//! ```rust
//! use capflow_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let date = Date::from_ymd(2026, 3, 1).unwrap();
//! let structure = PaymentStructure::Single(SinglePayment::new(dec!(10_000), date));
//! assert!(structure.matches_financing_type(FinancingType::SinglePayment));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        BalloonPayment, Cashflow, CashflowId, CashflowStatus, CashflowType, Company, CompanyId,
        Confirmation, Date, DownPayment, FinancingType, Group, GroupId, InstallmentPlan,
        Investment, InvestmentId, InvestmentStatus, LeaseSchedule, MonthBucket, Notification,
        NotificationId, NotificationKind, NotificationPriority, PaymentInterval, PaymentStructure,
        Postponement, RelatedEntity, Role, RoleAssignment, SinglePayment, User, UserId,
    };
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{
    Cashflow, CashflowStatus, Date, FinancingType, Investment, InvestmentStatus, PaymentStructure,
};
