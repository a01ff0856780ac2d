//! Cashflow generation orchestration.
//!
//! Selects the expansion strategy from an investment's financing type, runs
//! the calculator, assigns the correct initial status, and reconciles the
//! generated total against the investment amount. A sum mismatch is flagged
//! in the outcome, never raised as an error; a missing or mismatched
//! structure is fatal and produces no partial set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use capflow_core::types::{
    Cashflow, CashflowStatus, FinancingType, Investment, InvestmentId, PaymentStructure,
};
use capflow_workflow::cashflow::initial_status_for;

use crate::calculator::{self, CashflowDraft, SumCheck, DEFAULT_TOLERANCE_PERCENT};
use crate::error::{ScheduleError, ScheduleResult};

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    /// Generated cashflow records (identifiers unassigned).
    pub cashflows: Vec<Cashflow>,
    /// Sum reconciliation against the investment total.
    pub sum_check: SumCheck,
    /// Non-fatal findings, e.g. a sum mismatch. The caller decides whether
    /// to block or warn.
    pub warnings: Vec<String>,
}

fn expand(
    financing_type: FinancingType,
    structure: &PaymentStructure,
) -> ScheduleResult<Vec<CashflowDraft>> {
    if !structure.matches_financing_type(financing_type) {
        return Err(ScheduleError::StructureMismatch { financing_type });
    }
    match structure {
        PaymentStructure::Single(single) => Ok(calculator::expand_single_payment(single)),
        PaymentStructure::Installments(plan) => calculator::expand_installment_plan(plan),
        PaymentStructure::Lease(lease) => calculator::expand_lease_schedule(lease),
    }
}

fn reconcile(drafts: &[CashflowDraft], expected_total: Decimal) -> (SumCheck, Vec<String>) {
    let sum_check = calculator::validate_sum(drafts, expected_total, DEFAULT_TOLERANCE_PERCENT);
    let mut warnings = Vec::new();
    if !sum_check.valid {
        warnings.push(format!(
            "generated total {} differs from investment total {} by {} (tolerance {}%)",
            sum_check.actual_total,
            sum_check.expected_total,
            sum_check.difference,
            sum_check.tolerance_percent
        ));
    }
    (sum_check, warnings)
}

/// Generates the cashflow set for a persisted investment.
///
/// Draft investments produce `planned` cashflows; an investment already
/// past draft produces `outstanding` ones (immediately awaiting manager
/// confirmation). The mapping is [`initial_status_for`].
///
/// # Errors
///
/// Returns `ScheduleError::MissingStructure` if the investment carries no
/// payment structure, `ScheduleError::StructureMismatch` if the structure
/// shape does not fit the financing type.
pub fn generate(investment: &Investment) -> ScheduleResult<Generated> {
    let structure =
        investment
            .payment_structure
            .as_ref()
            .ok_or(ScheduleError::MissingStructure {
                financing_type: investment.financing_type,
            })?;

    let drafts = expand(investment.financing_type, structure)?;
    let (sum_check, warnings) = reconcile(&drafts, investment.total_amount);

    let status = initial_status_for(investment.status);
    let cashflows = drafts
        .into_iter()
        .map(|d| d.into_cashflow(investment.id.clone(), status))
        .collect::<Vec<_>>();

    log::debug!(
        "generated {} cashflows for investment {} (status {status}, sum valid: {})",
        cashflows.len(),
        investment.id,
        sum_check.valid
    );

    Ok(Generated {
        cashflows,
        sum_check,
        warnings,
    })
}

/// Runs the same expansion without a persisted investment, for previewing a
/// schedule before the request is created.
///
/// Preview cashflows are always `planned` and carry an empty investment
/// reference.
pub fn preview(
    financing_type: FinancingType,
    structure: &PaymentStructure,
    total_amount: Decimal,
) -> ScheduleResult<Generated> {
    let drafts = expand(financing_type, structure)?;
    let (sum_check, warnings) = reconcile(&drafts, total_amount);

    let cashflows = drafts
        .into_iter()
        .map(|d| d.into_cashflow(InvestmentId::new(""), CashflowStatus::Planned))
        .collect();

    Ok(Generated {
        cashflows,
        sum_check,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use capflow_core::types::{
        CashflowType, CompanyId, Date, InvestmentStatus, LeaseSchedule, PaymentInterval,
        SinglePayment, UserId,
    };
    use capflow_core::types::InstallmentPlan;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn investment(
        status: InvestmentStatus,
        financing_type: FinancingType,
        total: Decimal,
        structure: Option<PaymentStructure>,
    ) -> Investment {
        let mut inv = Investment::new_draft(
            CompanyId::new("co-1"),
            "Server cluster",
            "IT",
            total,
            financing_type,
            UserId::new("u-1"),
            Utc::now(),
        );
        inv.id = InvestmentId::new("inv-1");
        inv.status = status;
        inv.payment_structure = structure;
        inv
    }

    #[test]
    fn test_single_payment_scenario() {
        let inv = investment(
            InvestmentStatus::Draft,
            FinancingType::SinglePayment,
            dec!(10_000),
            Some(PaymentStructure::Single(SinglePayment::new(
                dec!(10_000),
                d("2026-03-01"),
            ))),
        );
        let generated = generate(&inv).unwrap();

        assert_eq!(generated.cashflows.len(), 1);
        let cf = &generated.cashflows[0];
        assert_eq!(cf.flow_type, CashflowType::Single);
        assert_eq!(cf.amount, dec!(10_000));
        assert_eq!(cf.due_date, d("2026-03-01"));
        assert_eq!(cf.status, CashflowStatus::Planned);
        assert!(generated.sum_check.valid);
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn test_active_investment_generates_outstanding() {
        let inv = investment(
            InvestmentStatus::Active,
            FinancingType::Lease,
            dec!(12_000),
            Some(PaymentStructure::Lease(LeaseSchedule::new(
                dec!(500),
                24,
                d("2026-01-01"),
            ))),
        );
        let generated = generate(&inv).unwrap();
        assert!(generated
            .cashflows
            .iter()
            .all(|cf| cf.status == CashflowStatus::Outstanding));
        assert!(generated.cashflows.iter().all(|cf| cf.auto_confirmed));
    }

    #[test]
    fn test_missing_structure_is_fatal() {
        let inv = investment(
            InvestmentStatus::Draft,
            FinancingType::Installment,
            dec!(10_000),
            None,
        );
        let err = generate(&inv).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::MissingStructure {
                financing_type: FinancingType::Installment
            }
        );
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let inv = investment(
            InvestmentStatus::Draft,
            FinancingType::Lease,
            dec!(10_000),
            Some(PaymentStructure::Single(SinglePayment::new(
                dec!(10_000),
                d("2026-03-01"),
            ))),
        );
        let err = generate(&inv).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::StructureMismatch {
                financing_type: FinancingType::Lease
            }
        );
    }

    #[test]
    fn test_sum_mismatch_is_flagged_not_fatal() {
        let inv = investment(
            InvestmentStatus::Draft,
            FinancingType::SinglePayment,
            dec!(10_000),
            Some(PaymentStructure::Single(SinglePayment::new(
                dec!(7_000),
                d("2026-03-01"),
            ))),
        );
        let generated = generate(&inv).unwrap();
        assert_eq!(generated.cashflows.len(), 1);
        assert!(!generated.sum_check.valid);
        assert_eq!(generated.warnings.len(), 1);
    }

    #[test]
    fn test_rent_uses_lease_shape() {
        let inv = investment(
            InvestmentStatus::Draft,
            FinancingType::Rent,
            dec!(6_000),
            Some(PaymentStructure::Lease(LeaseSchedule::new(
                dec!(500),
                12,
                d("2026-01-01"),
            ))),
        );
        assert!(generate(&inv).is_ok());
    }

    #[test]
    fn test_regeneration_is_deterministic() {
        let inv = investment(
            InvestmentStatus::Active,
            FinancingType::Installment,
            dec!(10_004),
            Some(PaymentStructure::Installments(
                InstallmentPlan::new(12, dec!(667), d("2026-02-01"), PaymentInterval::Monthly)
                    .with_down_payment(dec!(2_000), d("2026-01-01")),
            )),
        );
        let first = generate(&inv).unwrap();
        let second = generate(&inv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview_without_identity() {
        let structure = PaymentStructure::Lease(LeaseSchedule::new(dec!(500), 6, d("2026-01-01")));
        let generated = preview(FinancingType::Lease, &structure, dec!(3_000)).unwrap();
        assert_eq!(generated.cashflows.len(), 6);
        assert!(generated
            .cashflows
            .iter()
            .all(|cf| cf.status == CashflowStatus::Planned));
        assert!(generated.sum_check.valid);
    }
}
