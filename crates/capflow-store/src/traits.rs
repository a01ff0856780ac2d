//! Storage traits for persistence.
//!
//! These traits define the interfaces the workflow engine writes through:
//! - [`InvestmentStore`]: investment records
//! - [`CashflowStore`]: scheduled payments, replaced wholesale per investment
//! - [`NotificationStore`]: rule-engine output
//!
//! The engine owns all mutation ordering, so the traits are synchronous;
//! a backend that needs async I/O wraps it behind these calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use capflow_core::types::{
    Cashflow, CashflowId, Investment, InvestmentId, Notification, NotificationId, UserId,
};

use crate::error::StoreResult;
use crate::filter::{CashflowFilter, InvestmentFilter, NotificationFilter};

/// Investment record storage.
pub trait InvestmentStore: Send + Sync {
    /// Insert a new investment, assigning a fresh id. Returns the stored
    /// record.
    fn create_investment(&self, investment: Investment) -> StoreResult<Investment>;

    /// Get an investment by id.
    fn get_investment(&self, id: &InvestmentId) -> StoreResult<Option<Investment>>;

    /// Overwrite an existing investment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists under the id.
    fn put_investment(&self, investment: &Investment) -> StoreResult<()>;

    /// Delete an investment. Returns whether a record was removed.
    fn delete_investment(&self, id: &InvestmentId) -> StoreResult<bool>;

    /// List investments matching the filter.
    fn list_investments(&self, filter: &InvestmentFilter) -> StoreResult<Vec<Investment>>;
}

/// Cashflow storage.
pub trait CashflowStore: Send + Sync {
    /// Get a cashflow by id.
    fn get_cashflow(&self, id: &CashflowId) -> StoreResult<Option<Cashflow>>;

    /// Overwrite an existing cashflow.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists under the id.
    fn put_cashflow(&self, cashflow: &Cashflow) -> StoreResult<()>;

    /// Replace every cashflow of an investment with the given set,
    /// assigning fresh ids. Returns the stored records.
    fn replace_for_investment(
        &self,
        investment_id: &InvestmentId,
        cashflows: Vec<Cashflow>,
    ) -> StoreResult<Vec<Cashflow>>;

    /// Delete every cashflow of an investment. Returns the removed count.
    fn delete_for_investment(&self, investment_id: &InvestmentId) -> StoreResult<u64>;

    /// List cashflows matching the filter.
    fn list_cashflows(&self, filter: &CashflowFilter) -> StoreResult<Vec<Cashflow>>;
}

/// Notification storage.
pub trait NotificationStore: Send + Sync {
    /// Insert notifications, assigning fresh ids. Returns the stored
    /// records.
    fn create_notifications(&self, notifications: Vec<Notification>)
        -> StoreResult<Vec<Notification>>;

    /// Get a notification by id.
    fn get_notification(&self, id: &NotificationId) -> StoreResult<Option<Notification>>;

    /// Mark a notification read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists under the id.
    fn mark_read(&self, id: &NotificationId) -> StoreResult<()>;

    /// Delete every notification addressed to a recipient. Returns the
    /// removed count.
    fn delete_for_recipient(&self, recipient: &UserId) -> StoreResult<u64>;

    /// Delete notifications created before the cutoff. Returns the removed
    /// count.
    fn purge_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;

    /// List notifications matching the filter.
    fn list_notifications(&self, filter: &NotificationFilter) -> StoreResult<Vec<Notification>>;
}

/// Combined storage adapter handed to the engine.
#[derive(Clone)]
pub struct Stores {
    /// Investment store.
    pub investments: Arc<dyn InvestmentStore>,
    /// Cashflow store.
    pub cashflows: Arc<dyn CashflowStore>,
    /// Notification store.
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    /// Builds an adapter where one backend serves all three stores.
    #[must_use]
    pub fn from_single<S>(store: Arc<S>) -> Self
    where
        S: InvestmentStore + CashflowStore + NotificationStore + 'static,
    {
        Self {
            investments: store.clone(),
            cashflows: store.clone(),
            notifications: store,
        }
    }
}
