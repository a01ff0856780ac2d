//! Payment structure types.
//!
//! An investment's repayment obligation is described declaratively by one of
//! three structure shapes. The calculator expands these into individual
//! cashflow records; nothing here performs date arithmetic itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Date;

/// The shape of an investment's repayment obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    /// One payment on a single date.
    SinglePayment,
    /// Down payment + N equal installments + optional balloon.
    Installment,
    /// Recurring monthly lease rate over a fixed duration.
    Lease,
    /// Recurring monthly rent; structurally identical to a lease.
    Rent,
}

impl fmt::Display for FinancingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FinancingType::SinglePayment => "Single Payment",
            FinancingType::Installment => "Installment",
            FinancingType::Lease => "Lease",
            FinancingType::Rent => "Rent",
        };
        write!(f, "{name}")
    }
}

/// Interval between installment payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentInterval {
    /// One installment per month.
    #[default]
    Monthly,
    /// One installment every three months.
    Quarterly,
    /// One installment every twelve months.
    Yearly,
}

impl PaymentInterval {
    /// Returns the number of months between two consecutive installments.
    #[must_use]
    pub fn months_per_step(&self) -> u32 {
        match self {
            PaymentInterval::Monthly => 1,
            PaymentInterval::Quarterly => 3,
            PaymentInterval::Yearly => 12,
        }
    }
}

impl fmt::Display for PaymentInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentInterval::Monthly => "Monthly",
            PaymentInterval::Quarterly => "Quarterly",
            PaymentInterval::Yearly => "Yearly",
        };
        write!(f, "{name}")
    }
}

/// A single-payment structure: one amount on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglePayment {
    /// Payment amount.
    pub amount: Decimal,
    /// Nominal payment date.
    pub date: Date,
    /// Manually agreed due date overriding the nominal date.
    pub due_date_override: Option<Date>,
}

impl SinglePayment {
    /// Creates a single payment on the given date.
    #[must_use]
    pub fn new(amount: Decimal, date: Date) -> Self {
        Self {
            amount,
            date,
            due_date_override: None,
        }
    }

    /// Sets a due-date override.
    #[must_use]
    pub fn with_due_date_override(mut self, date: Date) -> Self {
        self.due_date_override = Some(date);
        self
    }
}

/// An up-front payment preceding the regular schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownPayment {
    /// Down-payment amount.
    pub amount: Decimal,
    /// Down-payment date.
    pub date: Date,
}

/// A final lump-sum payment closing the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalloonPayment {
    /// Balloon amount.
    pub amount: Decimal,
    /// Balloon date.
    pub date: Date,
}

/// An installment plan: optional down payment, N equal rates, optional balloon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Optional down payment before the first rate.
    pub down_payment: Option<DownPayment>,
    /// Number of equal installments.
    pub rate_count: u32,
    /// Amount of each installment.
    pub rate_amount: Decimal,
    /// Due date of the first installment.
    pub first_rate_date: Date,
    /// Step between installments.
    pub interval: PaymentInterval,
    /// Optional final balloon payment.
    pub balloon: Option<BalloonPayment>,
    /// Per-installment due-date overrides, keyed by zero-based rate index.
    #[serde(default)]
    pub due_date_overrides: BTreeMap<u32, Date>,
}

impl InstallmentPlan {
    /// Creates a plan of `rate_count` equal rates starting at `first_rate_date`.
    #[must_use]
    pub fn new(
        rate_count: u32,
        rate_amount: Decimal,
        first_rate_date: Date,
        interval: PaymentInterval,
    ) -> Self {
        Self {
            down_payment: None,
            rate_count,
            rate_amount,
            first_rate_date,
            interval,
            balloon: None,
            due_date_overrides: BTreeMap::new(),
        }
    }

    /// Adds a down payment.
    #[must_use]
    pub fn with_down_payment(mut self, amount: Decimal, date: Date) -> Self {
        self.down_payment = Some(DownPayment { amount, date });
        self
    }

    /// Adds a balloon payment.
    #[must_use]
    pub fn with_balloon(mut self, amount: Decimal, date: Date) -> Self {
        self.balloon = Some(BalloonPayment { amount, date });
        self
    }

    /// Overrides the due date of the rate at the given zero-based index.
    #[must_use]
    pub fn with_due_date_override(mut self, index: u32, date: Date) -> Self {
        self.due_date_overrides.insert(index, date);
        self
    }
}

/// A lease or rent schedule: fixed monthly rate over a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseSchedule {
    /// Optional down payment before the first rate.
    pub down_payment: Option<DownPayment>,
    /// Fixed monthly rate.
    pub monthly_rate: Decimal,
    /// Duration in months.
    pub duration_months: u32,
    /// Due date of the first monthly rate.
    pub start_month: Date,
    /// Optional balloon amount, due one month after the last rate.
    pub balloon_amount: Option<Decimal>,
    /// Lease rates bypass manual manager pre-confirmation when set.
    #[serde(default = "default_auto_confirm")]
    pub auto_confirm: bool,
}

fn default_auto_confirm() -> bool {
    true
}

impl LeaseSchedule {
    /// Creates a lease schedule of `duration_months` rates from `start_month`.
    ///
    /// Auto-confirmation defaults to true: lease rates are contractually
    /// fixed and require no manual manager pre-confirmation.
    #[must_use]
    pub fn new(monthly_rate: Decimal, duration_months: u32, start_month: Date) -> Self {
        Self {
            down_payment: None,
            monthly_rate,
            duration_months,
            start_month,
            balloon_amount: None,
            auto_confirm: true,
        }
    }

    /// Adds a down payment.
    #[must_use]
    pub fn with_down_payment(mut self, amount: Decimal, date: Date) -> Self {
        self.down_payment = Some(DownPayment { amount, date });
        self
    }

    /// Adds a balloon amount due one month after the last rate.
    #[must_use]
    pub fn with_balloon(mut self, amount: Decimal) -> Self {
        self.balloon_amount = Some(amount);
        self
    }

    /// Sets the auto-confirmation flag.
    #[must_use]
    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }
}

/// A closed union over the three payment-structure shapes.
///
/// Exactly one variant applies to an investment, and it must match the
/// investment's financing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PaymentStructure {
    /// One payment on a single date.
    Single(SinglePayment),
    /// Down payment + equal installments + optional balloon.
    Installments(InstallmentPlan),
    /// Monthly lease/rent rates over a fixed duration.
    Lease(LeaseSchedule),
}

impl PaymentStructure {
    /// Returns true if this structure shape is valid for the financing type.
    ///
    /// Lease and rent financing share the lease structure shape.
    #[must_use]
    pub fn matches_financing_type(&self, financing_type: FinancingType) -> bool {
        matches!(
            (self, financing_type),
            (PaymentStructure::Single(_), FinancingType::SinglePayment)
                | (PaymentStructure::Installments(_), FinancingType::Installment)
                | (PaymentStructure::Lease(_), FinancingType::Lease)
                | (PaymentStructure::Lease(_), FinancingType::Rent)
        )
    }

    /// Returns the total nominal value of the structure.
    ///
    /// This is the figure reconciled against the investment's total amount.
    #[must_use]
    pub fn nominal_total(&self) -> Decimal {
        match self {
            PaymentStructure::Single(single) => single.amount,
            PaymentStructure::Installments(plan) => {
                let down = plan.down_payment.as_ref().map_or(Decimal::ZERO, |d| d.amount);
                let balloon = plan.balloon.as_ref().map_or(Decimal::ZERO, |b| b.amount);
                down + plan.rate_amount * Decimal::from(plan.rate_count) + balloon
            }
            PaymentStructure::Lease(lease) => {
                let down = lease.down_payment.as_ref().map_or(Decimal::ZERO, |d| d.amount);
                let balloon = lease.balloon_amount.unwrap_or(Decimal::ZERO);
                down + lease.monthly_rate * Decimal::from(lease.duration_months) + balloon
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_interval_steps() {
        assert_eq!(PaymentInterval::Monthly.months_per_step(), 1);
        assert_eq!(PaymentInterval::Quarterly.months_per_step(), 3);
        assert_eq!(PaymentInterval::Yearly.months_per_step(), 12);
    }

    #[test]
    fn test_structure_matches_financing_type() {
        let single = PaymentStructure::Single(SinglePayment::new(dec!(10_000), d("2026-03-01")));
        assert!(single.matches_financing_type(FinancingType::SinglePayment));
        assert!(!single.matches_financing_type(FinancingType::Installment));

        let lease = PaymentStructure::Lease(LeaseSchedule::new(dec!(500), 24, d("2026-01-01")));
        assert!(lease.matches_financing_type(FinancingType::Lease));
        assert!(lease.matches_financing_type(FinancingType::Rent));
        assert!(!lease.matches_financing_type(FinancingType::SinglePayment));
    }

    #[test]
    fn test_nominal_total_installments() {
        let plan = InstallmentPlan::new(12, dec!(667), d("2026-02-01"), PaymentInterval::Monthly)
            .with_down_payment(dec!(2_000), d("2026-01-01"));
        let structure = PaymentStructure::Installments(plan);
        assert_eq!(structure.nominal_total(), dec!(10_004));
    }

    #[test]
    fn test_lease_auto_confirm_defaults_true() {
        let lease = LeaseSchedule::new(dec!(500), 24, d("2026-01-01"));
        assert!(lease.auto_confirm);

        // serde default applies when the field is absent
        let parsed: LeaseSchedule = serde_json::from_str(
            r#"{"down_payment":null,"monthly_rate":"500","duration_months":24,
                "start_month":"2026-01-01","balloon_amount":null}"#,
        )
        .unwrap();
        assert!(parsed.auto_confirm);
    }
}
