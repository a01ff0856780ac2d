//! Pure expansion of payment structures into cashflow drafts.
//!
//! Each function turns one structure shape into an ordered list of
//! [`CashflowDraft`] records. Drafts carry no identity and no status;
//! the generator assigns both.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use capflow_core::error::CoreError;
use capflow_core::types::{
    Cashflow, CashflowId, CashflowStatus, CashflowType, Date, InstallmentPlan, InvestmentId,
    LeaseSchedule, MonthBucket, SinglePayment,
};

use crate::error::ScheduleResult;

/// Default sum-reconciliation tolerance, in percent of the expected total.
///
/// Rate amounts are rounded to whole currency units and may not divide the
/// total exactly; 1% absorbs that rounding error. Callers may scale the
/// tolerance with the number of periods if their rounding error grows.
pub const DEFAULT_TOLERANCE_PERCENT: Decimal = dec!(1);

/// A cashflow not yet attached to an investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowDraft {
    /// Computed due date.
    pub due_date: Date,
    /// Due-date override carried over from the structure.
    pub custom_due_date: Option<Date>,
    /// Payment amount.
    pub amount: Decimal,
    /// Payment type.
    pub flow_type: CashflowType,
    /// One-based period index for periodic rates.
    pub period_index: Option<u32>,
    /// Total period count for periodic rates.
    pub period_count: Option<u32>,
    /// Whether the payment bypasses manual manager pre-confirmation.
    pub auto_confirmed: bool,
}

impl CashflowDraft {
    fn payment(due_date: Date, amount: Decimal, flow_type: CashflowType) -> Self {
        Self {
            due_date,
            custom_due_date: None,
            amount,
            flow_type,
            period_index: None,
            period_count: None,
            auto_confirmed: false,
        }
    }

    /// Returns the effective due date (override if present).
    #[must_use]
    pub fn effective_due_date(&self) -> Date {
        self.custom_due_date.unwrap_or(self.due_date)
    }

    /// Materializes the draft into a cashflow owned by `investment_id`.
    ///
    /// The record identifier is left empty for the store to assign. The
    /// month/year bucket is derived from the *effective* due date, so
    /// calendar reporting reflects the latest agreed date.
    #[must_use]
    pub fn into_cashflow(self, investment_id: InvestmentId, status: CashflowStatus) -> Cashflow {
        let bucket = MonthBucket::from(self.effective_due_date());
        Cashflow {
            id: CashflowId::new(""),
            investment_id,
            due_date: self.due_date,
            custom_due_date: self.custom_due_date,
            amount: self.amount,
            flow_type: self.flow_type,
            period_index: self.period_index,
            period_count: self.period_count,
            bucket,
            status,
            manager_confirmation: None,
            executive_confirmation: None,
            postponement: None,
            auto_confirmed: self.auto_confirmed,
        }
    }
}

/// Expands a single-payment structure into exactly one draft.
#[must_use]
pub fn expand_single_payment(structure: &SinglePayment) -> Vec<CashflowDraft> {
    let mut draft = CashflowDraft::payment(structure.date, structure.amount, CashflowType::Single);
    draft.custom_due_date = structure.due_date_override;
    vec![draft]
}

/// Expands an installment plan: optional down payment, N equal rates
/// stepped by the configured interval, optional balloon.
pub fn expand_installment_plan(plan: &InstallmentPlan) -> ScheduleResult<Vec<CashflowDraft>> {
    if plan.rate_count == 0 {
        return Err(CoreError::invalid_structure("installment plan has zero rates").into());
    }

    let mut drafts = Vec::with_capacity(plan.rate_count as usize + 2);

    if let Some(down) = &plan.down_payment {
        drafts.push(CashflowDraft::payment(
            down.date,
            down.amount,
            CashflowType::DownPayment,
        ));
    }

    let step = plan.interval.months_per_step() as i32;
    for i in 0..plan.rate_count {
        let due_date = plan.first_rate_date.add_months(i as i32 * step)?;
        let mut draft = CashflowDraft::payment(due_date, plan.rate_amount, CashflowType::Installment);
        draft.custom_due_date = plan.due_date_overrides.get(&i).copied();
        draft.period_index = Some(i + 1);
        draft.period_count = Some(plan.rate_count);
        drafts.push(draft);
    }

    if let Some(balloon) = &plan.balloon {
        drafts.push(CashflowDraft::payment(
            balloon.date,
            balloon.amount,
            CashflowType::Balloon,
        ));
    }

    Ok(drafts)
}

/// Expands a lease/rent schedule: optional down payment, monthly rates over
/// the duration, optional balloon one month after the last rate.
pub fn expand_lease_schedule(lease: &LeaseSchedule) -> ScheduleResult<Vec<CashflowDraft>> {
    if lease.duration_months == 0 {
        return Err(CoreError::invalid_structure("lease schedule has zero duration").into());
    }

    let mut drafts = Vec::with_capacity(lease.duration_months as usize + 2);

    if let Some(down) = &lease.down_payment {
        drafts.push(CashflowDraft::payment(
            down.date,
            down.amount,
            CashflowType::DownPayment,
        ));
    }

    for i in 0..lease.duration_months {
        let due_date = lease.start_month.add_months(i as i32)?;
        let mut draft = CashflowDraft::payment(due_date, lease.monthly_rate, CashflowType::Installment);
        draft.period_index = Some(i + 1);
        draft.period_count = Some(lease.duration_months);
        draft.auto_confirmed = lease.auto_confirm;
        drafts.push(draft);
    }

    if let Some(balloon_amount) = lease.balloon_amount {
        let due_date = lease.start_month.add_months(lease.duration_months as i32)?;
        drafts.push(CashflowDraft::payment(
            due_date,
            balloon_amount,
            CashflowType::Balloon,
        ));
    }

    Ok(drafts)
}

/// Result of reconciling a draft set's total against an expected total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumCheck {
    /// True if the difference is within tolerance.
    pub valid: bool,
    /// The expected total (the investment's total amount).
    pub expected_total: Decimal,
    /// The actual sum of draft amounts.
    pub actual_total: Decimal,
    /// Absolute difference between the two.
    pub difference: Decimal,
    /// The tolerance applied, in percent.
    pub tolerance_percent: Decimal,
}

/// Sums the draft amounts and compares the absolute difference against
/// `expected_total * tolerance_percent / 100`.
#[must_use]
pub fn validate_sum(
    drafts: &[CashflowDraft],
    expected_total: Decimal,
    tolerance_percent: Decimal,
) -> SumCheck {
    let actual_total: Decimal = drafts.iter().map(|d| d.amount).sum();
    let difference = (actual_total - expected_total).abs();
    let allowed = expected_total.abs() * tolerance_percent / dec!(100);
    SumCheck {
        valid: difference <= allowed,
        expected_total,
        actual_total,
        difference,
        tolerance_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capflow_core::types::PaymentInterval;
    use proptest::prelude::*;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_single_payment() {
        let drafts = expand_single_payment(&SinglePayment::new(dec!(10_000), d("2026-03-01")));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].flow_type, CashflowType::Single);
        assert_eq!(drafts[0].amount, dec!(10_000));
        assert_eq!(drafts[0].due_date, d("2026-03-01"));
    }

    #[test]
    fn test_single_payment_override() {
        let structure = SinglePayment::new(dec!(10_000), d("2026-03-01"))
            .with_due_date_override(d("2026-04-15"));
        let drafts = expand_single_payment(&structure);
        assert_eq!(drafts[0].effective_due_date(), d("2026-04-15"));
    }

    #[test]
    fn test_installment_plan_scenario() {
        // Down payment 2,000 on 2026-01-01, 12 monthly rates of 667 from
        // 2026-02-01, no balloon.
        let plan = InstallmentPlan::new(12, dec!(667), d("2026-02-01"), PaymentInterval::Monthly)
            .with_down_payment(dec!(2_000), d("2026-01-01"));
        let drafts = expand_installment_plan(&plan).unwrap();

        assert_eq!(drafts.len(), 13);
        assert_eq!(drafts[0].flow_type, CashflowType::DownPayment);
        assert_eq!(drafts[1].due_date, d("2026-02-01"));
        assert_eq!(drafts[1].period_index, Some(1));
        assert_eq!(drafts[12].due_date, d("2027-01-01"));
        assert_eq!(drafts[12].period_index, Some(12));

        let check = validate_sum(&drafts, dec!(10_000), DEFAULT_TOLERANCE_PERCENT);
        assert!(check.valid);
        assert_eq!(check.actual_total, dec!(10_004));
        assert_eq!(check.difference, dec!(4));
    }

    #[test]
    fn test_installment_quarterly_spacing() {
        let plan = InstallmentPlan::new(4, dec!(2_500), d("2026-01-15"), PaymentInterval::Quarterly);
        let drafts = expand_installment_plan(&plan).unwrap();
        let dates: Vec<Date> = drafts.iter().map(|r| r.due_date).collect();
        assert_eq!(
            dates,
            vec![d("2026-01-15"), d("2026-04-15"), d("2026-07-15"), d("2026-10-15")]
        );
    }

    #[test]
    fn test_installment_due_date_override() {
        let plan = InstallmentPlan::new(3, dec!(100), d("2026-01-01"), PaymentInterval::Monthly)
            .with_due_date_override(1, d("2026-02-20"));
        let drafts = expand_installment_plan(&plan).unwrap();
        assert_eq!(drafts[1].due_date, d("2026-02-01"));
        assert_eq!(drafts[1].effective_due_date(), d("2026-02-20"));
        assert_eq!(drafts[0].custom_due_date, None);
    }

    #[test]
    fn test_installment_balloon_last() {
        let plan = InstallmentPlan::new(2, dec!(1_000), d("2026-01-01"), PaymentInterval::Monthly)
            .with_balloon(dec!(5_000), d("2026-03-01"));
        let drafts = expand_installment_plan(&plan).unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[2].flow_type, CashflowType::Balloon);
        assert_eq!(drafts[2].amount, dec!(5_000));
    }

    #[test]
    fn test_installment_zero_rates_rejected() {
        let plan = InstallmentPlan::new(0, dec!(100), d("2026-01-01"), PaymentInterval::Monthly);
        assert!(expand_installment_plan(&plan).is_err());
    }

    #[test]
    fn test_lease_scenario() {
        // Monthly rate 500, duration 24, start 2026-01-01, auto-confirm.
        let lease = LeaseSchedule::new(dec!(500), 24, d("2026-01-01"));
        let drafts = expand_lease_schedule(&lease).unwrap();

        assert_eq!(drafts.len(), 24);
        assert!(drafts.iter().all(|r| r.auto_confirmed));
        assert_eq!(drafts[0].due_date, d("2026-01-01"));
        assert_eq!(drafts[23].due_date, d("2027-12-01"));
    }

    #[test]
    fn test_lease_with_down_payment_and_balloon() {
        let lease = LeaseSchedule::new(dec!(500), 12, d("2026-01-01"))
            .with_down_payment(dec!(1_000), d("2025-12-15"))
            .with_balloon(dec!(3_000));
        let drafts = expand_lease_schedule(&lease).unwrap();

        assert_eq!(drafts.len(), 14);
        assert_eq!(drafts[0].flow_type, CashflowType::DownPayment);
        let balloon = drafts.last().unwrap();
        assert_eq!(balloon.flow_type, CashflowType::Balloon);
        // Balloon is due one month after the last rate.
        assert_eq!(balloon.due_date, d("2027-01-01"));
        // Down payment and balloon are not auto-confirmed.
        assert!(!drafts[0].auto_confirmed);
        assert!(!balloon.auto_confirmed);
    }

    #[test]
    fn test_sum_check_out_of_tolerance() {
        let drafts = expand_single_payment(&SinglePayment::new(dec!(8_000), d("2026-03-01")));
        let check = validate_sum(&drafts, dec!(10_000), DEFAULT_TOLERANCE_PERCENT);
        assert!(!check.valid);
        assert_eq!(check.difference, dec!(2_000));
    }

    proptest! {
        #[test]
        fn prop_installment_shape(
            rate_count in 1u32..=60,
            rate_amount in 1i64..=10_000,
            interval in prop_oneof![
                Just(PaymentInterval::Monthly),
                Just(PaymentInterval::Quarterly),
                Just(PaymentInterval::Yearly),
            ],
        ) {
            let plan = InstallmentPlan::new(
                rate_count,
                Decimal::from(rate_amount),
                d("2026-01-15"),
                interval,
            );
            let drafts = expand_installment_plan(&plan).unwrap();

            prop_assert_eq!(drafts.len(), rate_count as usize);
            // Strictly increasing due dates spaced by the interval.
            for pair in drafts.windows(2) {
                prop_assert!(pair[0].due_date < pair[1].due_date);
                let expected = pair[0]
                    .due_date
                    .add_months(interval.months_per_step() as i32)
                    .unwrap();
                prop_assert_eq!(pair[1].due_date, expected);
            }
            // Period indices are 1..=N.
            for (i, draft) in drafts.iter().enumerate() {
                prop_assert_eq!(draft.period_index, Some(i as u32 + 1));
                prop_assert_eq!(draft.period_count, Some(rate_count));
            }
        }

        #[test]
        fn prop_sum_reconciliation(
            rate_count in 1u32..=48,
            rate_amount in 1i64..=5_000,
            down in proptest::option::of(1i64..=20_000),
            balloon in proptest::option::of(1i64..=20_000),
        ) {
            let mut plan = InstallmentPlan::new(
                rate_count,
                Decimal::from(rate_amount),
                d("2026-02-01"),
                PaymentInterval::Monthly,
            );
            if let Some(amount) = down {
                plan = plan.with_down_payment(Decimal::from(amount), d("2026-01-01"));
            }
            if let Some(amount) = balloon {
                let last = d("2026-02-01").add_months(rate_count as i32).unwrap();
                plan = plan.with_balloon(Decimal::from(amount), last);
            }

            let drafts = expand_installment_plan(&plan).unwrap();
            let nominal = capflow_core::types::PaymentStructure::Installments(plan).nominal_total();
            let check = validate_sum(&drafts, nominal, DEFAULT_TOLERANCE_PERCENT);
            prop_assert!(check.valid);
            prop_assert_eq!(check.difference, Decimal::ZERO);
        }

        #[test]
        fn prop_lease_sum_reconciliation(
            duration in 1u32..=120,
            rate in 1i64..=5_000,
            down in proptest::option::of(1i64..=20_000),
            balloon in proptest::option::of(1i64..=20_000),
        ) {
            let mut lease = LeaseSchedule::new(Decimal::from(rate), duration, d("2026-01-01"));
            if let Some(amount) = down {
                lease = lease.with_down_payment(Decimal::from(amount), d("2025-12-15"));
            }
            if let Some(amount) = balloon {
                lease = lease.with_balloon(Decimal::from(amount));
            }

            let drafts = expand_lease_schedule(&lease).unwrap();
            let nominal = capflow_core::types::PaymentStructure::Lease(lease).nominal_total();
            let check = validate_sum(&drafts, nominal, DEFAULT_TOLERANCE_PERCENT);
            prop_assert!(check.valid);
            prop_assert_eq!(check.difference, Decimal::ZERO);
        }

        #[test]
        fn prop_lease_shape(duration in 1u32..=120, rate in 1i64..=5_000) {
            let lease = LeaseSchedule::new(Decimal::from(rate), duration, d("2026-01-01"));
            let drafts = expand_lease_schedule(&lease).unwrap();

            prop_assert_eq!(drafts.len(), duration as usize);
            for pair in drafts.windows(2) {
                let expected = pair[0].due_date.add_months(1).unwrap();
                prop_assert_eq!(pair[1].due_date, expected);
            }
        }
    }
}
