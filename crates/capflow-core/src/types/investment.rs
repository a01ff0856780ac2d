//! Investment record and lifecycle status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CompanyId, FinancingType, InvestmentId, PaymentStructure, UserId};

/// Lifecycle status of an investment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    /// Being edited by its creator; not yet visible to approvers.
    #[default]
    Draft,
    /// Submitted for approval.
    Submitted,
    /// Approved by an approval-role holder.
    Approved,
    /// Rejected; may be reworked and resubmitted.
    Rejected,
    /// Payments are running.
    Active,
    /// All obligations settled. Terminal.
    Completed,
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvestmentStatus::Draft => "Draft",
            InvestmentStatus::Submitted => "Submitted",
            InvestmentStatus::Approved => "Approved",
            InvestmentStatus::Rejected => "Rejected",
            InvestmentStatus::Active => "Active",
            InvestmentStatus::Completed => "Completed",
        };
        write!(f, "{name}")
    }
}

/// Free-form descriptive metadata attached to an investment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentMetadata {
    /// Vendor or supplier name.
    pub vendor: Option<String>,
    /// External contract number.
    pub contract_number: Option<String>,
    /// Internal reference.
    pub reference: Option<String>,
}

/// A corporate capital-investment request.
///
/// Created in draft state, moved through the approval workflow by guarded
/// status transitions, and expanded into cashflows by the schedule generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// Record identifier (assigned by the store).
    pub id: InvestmentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Investment category (e.g. "IT", "Vehicles").
    pub category: String,
    /// Short descriptive name.
    pub name: String,
    /// Total investment amount.
    pub total_amount: Decimal,
    /// Shape of the repayment obligation.
    pub financing_type: FinancingType,
    /// Lifecycle status.
    pub status: InvestmentStatus,
    /// Declarative payment structure; may be absent while drafting.
    pub payment_structure: Option<PaymentStructure>,
    /// Rejection comment from the most recent rejection, if any.
    pub rejection_comment: Option<String>,
    /// User who created the request.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Descriptive metadata.
    #[serde(default)]
    pub metadata: InvestmentMetadata,
}

impl Investment {
    /// Creates a new draft investment.
    #[must_use]
    pub fn new_draft(
        company_id: CompanyId,
        name: impl Into<String>,
        category: impl Into<String>,
        total_amount: Decimal,
        financing_type: FinancingType,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvestmentId::new(""),
            company_id,
            category: category.into(),
            name: name.into(),
            total_amount,
            financing_type,
            status: InvestmentStatus::Draft,
            payment_structure: None,
            rejection_comment: None,
            created_by,
            created_at: now,
            updated_at: now,
            metadata: InvestmentMetadata::default(),
        }
    }

    /// Sets the payment structure.
    #[must_use]
    pub fn with_payment_structure(mut self, structure: PaymentStructure) -> Self {
        self.payment_structure = Some(structure);
        self
    }

    /// Returns true if the structure variant matches the financing type.
    ///
    /// An absent structure is not a mismatch; completeness is checked at
    /// submission and generation time.
    #[must_use]
    pub fn structure_consistent(&self) -> bool {
        self.payment_structure
            .as_ref()
            .map_or(true, |s| s.matches_financing_type(self.financing_type))
    }

    /// Returns true if the request carries everything submission requires.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.total_amount > Decimal::ZERO
            && !self.company_id.as_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Date, SinglePayment};
    use rust_decimal_macros::dec;

    fn draft() -> Investment {
        Investment::new_draft(
            CompanyId::new("co-1"),
            "Forklift",
            "Vehicles",
            dec!(10_000),
            FinancingType::SinglePayment,
            UserId::new("u-1"),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_draft_defaults() {
        let inv = draft();
        assert_eq!(inv.status, InvestmentStatus::Draft);
        assert!(inv.payment_structure.is_none());
        assert!(inv.is_complete());
    }

    #[test]
    fn test_incomplete_without_name() {
        let mut inv = draft();
        inv.name = "  ".to_string();
        assert!(!inv.is_complete());
    }

    #[test]
    fn test_structure_consistency() {
        let mut inv = draft();
        assert!(inv.structure_consistent());

        inv.payment_structure = Some(PaymentStructure::Single(SinglePayment::new(
            dec!(10_000),
            Date::parse("2026-03-01").unwrap(),
        )));
        assert!(inv.structure_consistent());

        inv.financing_type = FinancingType::Lease;
        assert!(!inv.structure_consistent());
    }
}
