//! Notification records emitted by the rule engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CashflowId, InvestmentId, NotificationId, UserId};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An investment was submitted for approval.
    InvestmentSubmitted,
    /// An investment was approved.
    InvestmentApproved,
    /// An investment was rejected.
    InvestmentRejected,
    /// A cashflow awaits executive confirmation.
    CashflowNeedsConfirmation,
    /// A cashflow's due date was postponed.
    CashflowPostponed,
    /// A payment is due within the next days.
    PaymentDueSoon,
    /// A payment's effective due date has passed unconfirmed.
    PaymentOverdue,
    /// The monthly payment report is due.
    MonthlyReportDue,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::InvestmentSubmitted => "Investment Submitted",
            NotificationKind::InvestmentApproved => "Investment Approved",
            NotificationKind::InvestmentRejected => "Investment Rejected",
            NotificationKind::CashflowNeedsConfirmation => "Cashflow Needs Confirmation",
            NotificationKind::CashflowPostponed => "Cashflow Postponed",
            NotificationKind::PaymentDueSoon => "Payment Due Soon",
            NotificationKind::PaymentOverdue => "Payment Overdue",
            NotificationKind::MonthlyReportDue => "Monthly Report Due",
        };
        write!(f, "{name}")
    }
}

/// Notification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Requires prompt attention.
    High,
}

/// Link from a notification to the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum RelatedEntity {
    /// Related investment.
    Investment(InvestmentId),
    /// Related cashflow.
    Cashflow(CashflowId),
}

/// A notification addressed to one user.
///
/// Created only by the rule engine; marked read by the user; deleted in
/// bulk by explicit user action or age-based cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Record identifier (assigned by the store).
    pub id: NotificationId,
    /// Recipient user.
    pub recipient: UserId,
    /// Notification category.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Priority.
    pub priority: NotificationPriority,
    /// Related investment or cashflow, if any.
    pub related: Option<RelatedEntity>,
    /// Read flag.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: NotificationPriority,
        related: Option<RelatedEntity>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(""),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            priority,
            related,
            read: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            UserId::new("u-1"),
            NotificationKind::InvestmentSubmitted,
            "Submitted",
            "Investment Forklift was submitted",
            NotificationPriority::Normal,
            Some(RelatedEntity::Investment(InvestmentId::new("inv-1"))),
            Utc::now(),
        );
        assert!(!n.read);
        assert_eq!(n.kind, NotificationKind::InvestmentSubmitted);
    }
}
