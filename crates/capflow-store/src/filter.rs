//! Typed filters for storage queries.
//!
//! Each filter field is optional; an unset field matches everything. The
//! same `matches` predicates back every storage implementation, so query
//! semantics cannot drift between backends.

use serde::{Deserialize, Serialize};

use capflow_core::types::{
    Cashflow, CashflowStatus, CompanyId, Date, FinancingType, Investment, InvestmentId,
    InvestmentStatus, MonthBucket, Notification, NotificationKind, UserId,
};

/// Investment filter for storage queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestmentFilter {
    /// Owning company.
    pub company_id: Option<CompanyId>,
    /// Lifecycle status.
    pub status: Option<InvestmentStatus>,
    /// Financing type.
    pub financing_type: Option<FinancingType>,
    /// Creator.
    pub created_by: Option<UserId>,
    /// Category (exact match).
    pub category: Option<String>,
}

impl InvestmentFilter {
    /// Filter for one company.
    #[must_use]
    pub fn by_company(company_id: CompanyId) -> Self {
        Self {
            company_id: Some(company_id),
            ..Default::default()
        }
    }

    /// Filter for one status.
    #[must_use]
    pub fn by_status(status: InvestmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Filter for one creator.
    #[must_use]
    pub fn by_creator(created_by: UserId) -> Self {
        Self {
            created_by: Some(created_by),
            ..Default::default()
        }
    }

    /// Check if this filter matches an investment.
    #[must_use]
    pub fn matches(&self, investment: &Investment) -> bool {
        if let Some(ref company_id) = self.company_id {
            if &investment.company_id != company_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if investment.status != status {
                return false;
            }
        }
        if let Some(financing_type) = self.financing_type {
            if investment.financing_type != financing_type {
                return false;
            }
        }
        if let Some(ref created_by) = self.created_by {
            if &investment.created_by != created_by {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &investment.category != category {
                return false;
            }
        }
        true
    }
}

/// Cashflow filter for storage queries.
///
/// Date-range fields apply to the effective due date, so a postponed
/// payment moves with its new date in calendar queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashflowFilter {
    /// Owning investment.
    pub investment_id: Option<InvestmentId>,
    /// Confirmation status.
    pub status: Option<CashflowStatus>,
    /// Month/year bucket.
    pub bucket: Option<MonthBucket>,
    /// Effective due date from (inclusive).
    pub due_from: Option<Date>,
    /// Effective due date to (inclusive).
    pub due_to: Option<Date>,
}

impl CashflowFilter {
    /// Filter for one investment.
    #[must_use]
    pub fn by_investment(investment_id: InvestmentId) -> Self {
        Self {
            investment_id: Some(investment_id),
            ..Default::default()
        }
    }

    /// Filter for one status.
    #[must_use]
    pub fn by_status(status: CashflowStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Filter for one month bucket.
    #[must_use]
    pub fn by_bucket(bucket: MonthBucket) -> Self {
        Self {
            bucket: Some(bucket),
            ..Default::default()
        }
    }

    /// Check if this filter matches a cashflow.
    #[must_use]
    pub fn matches(&self, cashflow: &Cashflow) -> bool {
        if let Some(ref investment_id) = self.investment_id {
            if &cashflow.investment_id != investment_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if cashflow.status != status {
                return false;
            }
        }
        if let Some(bucket) = self.bucket {
            if cashflow.bucket != bucket {
                return false;
            }
        }
        let due = cashflow.effective_due_date();
        if let Some(from) = self.due_from {
            if due < from {
                return false;
            }
        }
        if let Some(to) = self.due_to {
            if due > to {
                return false;
            }
        }
        true
    }
}

/// Notification filter for storage queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// Recipient user.
    pub recipient: Option<UserId>,
    /// Notification kind.
    pub kind: Option<NotificationKind>,
    /// Only unread notifications.
    pub unread_only: bool,
}

impl NotificationFilter {
    /// Filter for one recipient.
    #[must_use]
    pub fn by_recipient(recipient: UserId) -> Self {
        Self {
            recipient: Some(recipient),
            ..Default::default()
        }
    }

    /// Filter for one recipient's unread notifications.
    #[must_use]
    pub fn unread_for(recipient: UserId) -> Self {
        Self {
            recipient: Some(recipient),
            unread_only: true,
            ..Default::default()
        }
    }

    /// Check if this filter matches a notification.
    #[must_use]
    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(ref recipient) = self.recipient {
            if &notification.recipient != recipient {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if notification.kind != kind {
                return false;
            }
        }
        if self.unread_only && notification.read {
            return false;
        }
        true
    }
}
