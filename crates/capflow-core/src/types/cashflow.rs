//! Cashflow record: one scheduled payment derived from an investment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CashflowId, Date, InvestmentId, UserId};

/// Type of a scheduled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashflowType {
    /// Up-front payment before the regular schedule.
    DownPayment,
    /// One of N equal periodic rates.
    Installment,
    /// Final lump-sum payment.
    Balloon,
    /// The only payment of a single-payment investment.
    Single,
}

impl fmt::Display for CashflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CashflowType::DownPayment => "Down Payment",
            CashflowType::Installment => "Installment",
            CashflowType::Balloon => "Balloon",
            CashflowType::Single => "Single",
        };
        write!(f, "{name}")
    }
}

/// Confirmation status of a cashflow.
///
/// Every cashflow passes a two-step sign-off: first a manager-level
/// pre-confirmation, then an executive-level confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CashflowStatus {
    /// Scheduled but not yet awaiting action (investment still in approval).
    #[default]
    Planned,
    /// Awaiting manager pre-confirmation.
    Outstanding,
    /// Pre-confirmed by a manager; awaiting executive confirmation.
    PreConfirmed,
    /// Confirmed by an executive. Terminal.
    Confirmed,
    /// Due date moved; must re-enter the confirmation flow.
    Postponed,
    /// Cancelled. Terminal.
    Cancelled,
}

impl fmt::Display for CashflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CashflowStatus::Planned => "Planned",
            CashflowStatus::Outstanding => "Outstanding",
            CashflowStatus::PreConfirmed => "Pre-Confirmed",
            CashflowStatus::Confirmed => "Confirmed",
            CashflowStatus::Postponed => "Postponed",
            CashflowStatus::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// Month/year bucket a cashflow falls into for calendar reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthBucket {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl From<Date> for MonthBucket {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// One confirmation sign-off (manager or executive level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Confirming user.
    pub user_id: UserId,
    /// Confirmation timestamp.
    pub at: DateTime<Utc>,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Record of a manual due-date postponement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postponement {
    /// Effective due date before the postponement.
    pub original_due_date: Date,
    /// User who postponed.
    pub user_id: UserId,
    /// Postponement timestamp.
    pub at: DateTime<Utc>,
    /// Stated reason.
    pub reason: String,
}

/// One scheduled payment belonging to exactly one investment.
///
/// Created in bulk whenever an investment's payment structure is
/// (re)generated, and replaced wholesale when the structure changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Record identifier (assigned by the store).
    pub id: CashflowId,
    /// Owning investment.
    pub investment_id: InvestmentId,
    /// Computed due date from the payment structure.
    pub due_date: Date,
    /// Manually overridden due date, if any.
    pub custom_due_date: Option<Date>,
    /// Payment amount.
    pub amount: Decimal,
    /// Payment type.
    pub flow_type: CashflowType,
    /// One-based period index for installment/lease rates.
    pub period_index: Option<u32>,
    /// Total number of periods for installment/lease rates.
    pub period_count: Option<u32>,
    /// Month/year bucket derived from the effective due date.
    pub bucket: MonthBucket,
    /// Confirmation status.
    pub status: CashflowStatus,
    /// Manager-level pre-confirmation, once recorded.
    pub manager_confirmation: Option<Confirmation>,
    /// Executive-level confirmation, once recorded.
    pub executive_confirmation: Option<Confirmation>,
    /// Postponement metadata, once recorded.
    pub postponement: Option<Postponement>,
    /// Lease rates may bypass manual manager pre-confirmation.
    pub auto_confirmed: bool,
}

impl Cashflow {
    /// Returns the effective due date: the custom override if present,
    /// otherwise the computed due date.
    #[must_use]
    pub fn effective_due_date(&self) -> Date {
        self.custom_due_date.unwrap_or(self.due_date)
    }

    /// Re-derives the month/year bucket from the effective due date.
    ///
    /// Must be called after any change to `custom_due_date`, so calendar
    /// reporting always reflects the latest agreed date.
    pub fn rebucket(&mut self) {
        self.bucket = MonthBucket::from(self.effective_due_date());
    }
}

impl fmt::Display for Cashflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}, {})",
            self.effective_due_date(),
            self.amount,
            self.flow_type,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flow(due: &str) -> Cashflow {
        let due = Date::parse(due).unwrap();
        Cashflow {
            id: CashflowId::new("cf-1"),
            investment_id: InvestmentId::new("inv-1"),
            due_date: due,
            custom_due_date: None,
            amount: dec!(500),
            flow_type: CashflowType::Installment,
            period_index: Some(1),
            period_count: Some(12),
            bucket: MonthBucket::from(due),
            status: CashflowStatus::Planned,
            manager_confirmation: None,
            executive_confirmation: None,
            postponement: None,
            auto_confirmed: false,
        }
    }

    #[test]
    fn test_effective_due_date_prefers_override() {
        let mut cf = flow("2026-02-01");
        assert_eq!(cf.effective_due_date(), Date::parse("2026-02-01").unwrap());

        cf.custom_due_date = Some(Date::parse("2026-03-15").unwrap());
        assert_eq!(cf.effective_due_date(), Date::parse("2026-03-15").unwrap());
    }

    #[test]
    fn test_rebucket_follows_override() {
        let mut cf = flow("2026-02-01");
        assert_eq!(cf.bucket, MonthBucket { year: 2026, month: 2 });

        cf.custom_due_date = Some(Date::parse("2026-04-10").unwrap());
        cf.rebucket();
        assert_eq!(cf.bucket, MonthBucket { year: 2026, month: 4 });
    }
}
