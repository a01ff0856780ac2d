//! Transition guards: role permissions and per-action business invariants.
//!
//! The status machines check *shape* validity only; this module is the only
//! place where *who* may perform an action *under which conditions* is
//! decided. Guards never panic or error on a denial — they return a
//! structured [`GuardDecision`] carrying a human-readable reason, so the
//! surrounding application can display it directly.

use capflow_core::types::{
    Cashflow, CashflowStatus, CompanyId, Date, GroupId, Investment, InvestmentStatus, Role,
    RoleAssignment, UserId,
};

use crate::{cashflow, investment};

/// A guarded change request against an investment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvestmentAction {
    /// Submit a draft for approval.
    Submit,
    /// Approve a submitted request.
    Approve,
    /// Reject a submitted request. The comment is mandatory.
    Reject {
        /// Reason given to the creator.
        comment: String,
    },
    /// Move an approved request into the active phase.
    Activate,
    /// Close out an active request.
    Complete,
    /// Return a rejected request to draft for rework.
    ResetToDraft,
}

impl InvestmentAction {
    /// Returns the action's name for denial messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InvestmentAction::Submit => "submit",
            InvestmentAction::Approve => "approve",
            InvestmentAction::Reject { .. } => "reject",
            InvestmentAction::Activate => "activate",
            InvestmentAction::Complete => "complete",
            InvestmentAction::ResetToDraft => "reset to draft",
        }
    }

    /// Returns the status this action transitions the investment into.
    #[must_use]
    pub fn target_status(&self) -> InvestmentStatus {
        match self {
            InvestmentAction::Submit => InvestmentStatus::Submitted,
            InvestmentAction::Approve => InvestmentStatus::Approved,
            InvestmentAction::Reject { .. } => InvestmentStatus::Rejected,
            InvestmentAction::Activate => InvestmentStatus::Active,
            InvestmentAction::Complete => InvestmentStatus::Completed,
            InvestmentAction::ResetToDraft => InvestmentStatus::Draft,
        }
    }

    /// Static action -> allowed-roles table.
    #[must_use]
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            InvestmentAction::Submit | InvestmentAction::ResetToDraft => {
                &[Employee, Manager, Executive, Cfo, Admin]
            }
            InvestmentAction::Approve | InvestmentAction::Reject { .. } => &[Approver, Cfo, Admin],
            InvestmentAction::Activate | InvestmentAction::Complete => {
                &[Manager, Executive, Cfo, Admin]
            }
        }
    }
}

/// A guarded change request against a cashflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CashflowAction {
    /// Manager-level pre-confirmation.
    PreConfirm {
        /// Optional comment.
        comment: Option<String>,
    },
    /// Executive-level final confirmation.
    Confirm {
        /// Optional comment.
        comment: Option<String>,
    },
    /// Executive sends a pre-confirmed cashflow back to the manager.
    SendBack {
        /// Reason given to the manager. Mandatory.
        reason: String,
    },
    /// Move the effective due date later.
    Postpone {
        /// New effective due date. Must be strictly in the future.
        new_date: Date,
        /// Reason for the postponement. Mandatory.
        reason: String,
    },
    /// Cancel the cashflow.
    Cancel,
    /// Put a planned or postponed cashflow back into the confirmation flow.
    MakeOutstanding,
}

impl CashflowAction {
    /// Returns the action's name for denial messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CashflowAction::PreConfirm { .. } => "pre-confirm",
            CashflowAction::Confirm { .. } => "confirm",
            CashflowAction::SendBack { .. } => "send back",
            CashflowAction::Postpone { .. } => "postpone",
            CashflowAction::Cancel => "cancel",
            CashflowAction::MakeOutstanding => "make outstanding",
        }
    }

    /// Returns the status this action transitions the cashflow into.
    #[must_use]
    pub fn target_status(&self) -> CashflowStatus {
        match self {
            CashflowAction::PreConfirm { .. } => CashflowStatus::PreConfirmed,
            CashflowAction::Confirm { .. } => CashflowStatus::Confirmed,
            CashflowAction::SendBack { .. } => CashflowStatus::Outstanding,
            CashflowAction::Postpone { .. } => CashflowStatus::Postponed,
            CashflowAction::Cancel => CashflowStatus::Cancelled,
            CashflowAction::MakeOutstanding => CashflowStatus::Outstanding,
        }
    }

    /// Static action -> allowed-roles table.
    #[must_use]
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            CashflowAction::PreConfirm { .. } => &[Manager, Admin],
            CashflowAction::Confirm { .. }
            | CashflowAction::SendBack { .. }
            | CashflowAction::Cancel => &[Executive, Cfo, Admin],
            CashflowAction::Postpone { .. } | CashflowAction::MakeOutstanding => {
                &[Manager, Executive, Cfo, Admin]
            }
        }
    }
}

/// Outcome of a guard check for a status-changing action.
///
/// `target_status` is always the status the action would produce, allowed
/// or not, so callers can report what was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision<S> {
    /// Whether the action may proceed.
    pub allowed: bool,
    /// Human-readable denial reason; `None` when allowed.
    pub reason: Option<String>,
    /// The status the action targets.
    pub target_status: S,
}

impl<S> GuardDecision<S> {
    fn allow(target_status: S) -> Self {
        Self {
            allowed: true,
            reason: None,
            target_status,
        }
    }

    fn deny(target_status: S, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            target_status,
        }
    }
}

/// Outcome of an edit/delete permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the access may proceed.
    pub allowed: bool,
    /// Human-readable denial reason; `None` when allowed.
    pub reason: Option<String>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Returns the actor's roles in `group` that cover `company`.
fn roles_in_scope(
    assignments: &[RoleAssignment],
    actor: &UserId,
    group: &GroupId,
    company: &CompanyId,
) -> Vec<Role> {
    assignments
        .iter()
        .filter(|a| &a.user_id == actor && &a.group_id == group && a.covers_company(company))
        .map(|a| a.role)
        .collect()
}

/// Returns true if the actor holds a role scoped directly to `company`.
fn has_company_scoped_role(
    assignments: &[RoleAssignment],
    actor: &UserId,
    company: &CompanyId,
) -> bool {
    assignments
        .iter()
        .any(|a| &a.user_id == actor && a.company_id.as_ref() == Some(company))
}

/// Checks whether `actor` may perform `action` on `investment`.
///
/// Check order: role resolution in the investment's group, the action's
/// role table, the status machine, then action-specific invariants.
#[must_use]
pub fn can_perform_investment_action(
    actor: &UserId,
    group: &GroupId,
    assignments: &[RoleAssignment],
    investment: &Investment,
    action: &InvestmentAction,
) -> GuardDecision<InvestmentStatus> {
    let target = action.target_status();

    let roles = roles_in_scope(assignments, actor, group, &investment.company_id);
    if roles.is_empty() {
        return GuardDecision::deny(target, "no role in the investment's group");
    }

    let allowed = action.allowed_roles();
    if !roles.iter().any(|r| allowed.contains(r)) {
        return GuardDecision::deny(
            target,
            format!("role not permitted to {} investments", action.name()),
        );
    }

    if !investment::can_transition(investment.status, target) {
        return GuardDecision::deny(
            target,
            format!("cannot {} an investment in status {}", action.name(), investment.status),
        );
    }

    match action {
        InvestmentAction::Submit => {
            if !investment.is_complete() {
                return GuardDecision::deny(
                    target,
                    "investment is incomplete: name, amount and company are required",
                );
            }
            if !investment.structure_consistent() {
                return GuardDecision::deny(
                    target,
                    "payment structure does not match the financing type",
                );
            }
            let is_creator = &investment.created_by == actor;
            if !is_creator && !has_company_scoped_role(assignments, actor, &investment.company_id) {
                return GuardDecision::deny(
                    target,
                    "only the creator or a member of the investment's company may submit",
                );
            }
        }
        InvestmentAction::Reject { comment } => {
            if comment.trim().is_empty() {
                return GuardDecision::deny(target, "rejection requires a comment");
            }
        }
        _ => {}
    }

    GuardDecision::allow(target)
}

/// Checks whether `actor` may perform `action` on `cashflow`.
///
/// `today` is the injectable current date used for the postponement
/// future-date invariant.
#[must_use]
pub fn can_perform_cashflow_action(
    actor: &UserId,
    group: &GroupId,
    assignments: &[RoleAssignment],
    investment: &Investment,
    cashflow: &Cashflow,
    action: &CashflowAction,
    today: Date,
) -> GuardDecision<CashflowStatus> {
    let target = action.target_status();

    let roles = roles_in_scope(assignments, actor, group, &investment.company_id);
    if roles.is_empty() {
        return GuardDecision::deny(target, "no role in the investment's group");
    }

    let allowed = action.allowed_roles();
    if !roles.iter().any(|r| allowed.contains(r)) {
        return GuardDecision::deny(
            target,
            format!("role not permitted to {} cashflows", action.name()),
        );
    }

    if !cashflow::can_transition(cashflow.status, target) {
        return GuardDecision::deny(
            target,
            format!("cannot {} a cashflow in status {}", action.name(), cashflow.status),
        );
    }

    match action {
        CashflowAction::PreConfirm { .. } => {
            if !matches!(
                investment.status,
                InvestmentStatus::Approved | InvestmentStatus::Active
            ) {
                return GuardDecision::deny(
                    target,
                    "cashflows can only be pre-confirmed once the investment is approved",
                );
            }
        }
        CashflowAction::Confirm { .. } => {
            // The transition table already restricts Confirm to PreConfirmed
            // cashflows; only the scope invariant is checked here.
            // Executives confirm only for their own company; group-wide
            // roles (CFO, Admin) are exempt.
            let group_wide = roles.iter().any(|r| matches!(r, Role::Cfo | Role::Admin));
            if !group_wide && !has_company_scoped_role(assignments, actor, &investment.company_id) {
                return GuardDecision::deny(
                    target,
                    "confirming executive must belong to the investment's company",
                );
            }
        }
        CashflowAction::SendBack { reason } => {
            if reason.trim().is_empty() {
                return GuardDecision::deny(target, "sending back requires a reason");
            }
        }
        CashflowAction::Postpone { new_date, reason } => {
            if reason.trim().is_empty() {
                return GuardDecision::deny(target, "postponement requires a reason");
            }
            if *new_date <= today {
                return GuardDecision::deny(target, "postponement date must be in the future");
            }
        }
        CashflowAction::Cancel | CashflowAction::MakeOutstanding => {}
    }

    GuardDecision::allow(target)
}

/// Checks whether `actor` may edit `investment`.
///
/// Only draft investments are editable, by the creator or a same-company
/// executive-level role.
#[must_use]
pub fn can_edit_investment(
    actor: &UserId,
    assignments: &[RoleAssignment],
    investment: &Investment,
) -> AccessDecision {
    if investment.status != InvestmentStatus::Draft {
        return AccessDecision::deny("only draft investments can be edited");
    }
    if &investment.created_by == actor {
        return AccessDecision::allow();
    }
    let privileged = assignments.iter().any(|a| {
        &a.user_id == actor
            && matches!(a.role, Role::Executive | Role::Cfo | Role::Admin)
            && a.covers_company(&investment.company_id)
    });
    if privileged {
        AccessDecision::allow()
    } else {
        AccessDecision::deny("only the creator or a company executive may edit")
    }
}

/// Checks whether `actor` may delete `investment`. Same rules as editing.
#[must_use]
pub fn can_delete_investment(
    actor: &UserId,
    assignments: &[RoleAssignment],
    investment: &Investment,
) -> AccessDecision {
    if investment.status != InvestmentStatus::Draft {
        return AccessDecision::deny("only draft investments can be deleted");
    }
    can_edit_investment(actor, assignments, investment)
}

/// Checks whether `actor` may view `investment`.
///
/// Group-scoped oversight roles see every investment in the group; all
/// other roles see only their own company's investments (and their own).
#[must_use]
pub fn can_view_investment(
    actor: &UserId,
    group: &GroupId,
    assignments: &[RoleAssignment],
    investment: &Investment,
) -> bool {
    if &investment.created_by == actor {
        return true;
    }
    assignments.iter().any(|a| {
        &a.user_id == actor
            && &a.group_id == group
            && (a.role.is_group_scoped() || a.covers_company(&investment.company_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use capflow_core::types::{CashflowId, CashflowType, FinancingType, InvestmentId, MonthBucket};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn group() -> GroupId {
        GroupId::new("g-1")
    }

    fn investment(status: InvestmentStatus) -> Investment {
        let mut inv = Investment::new_draft(
            CompanyId::new("co-1"),
            "Forklift",
            "Vehicles",
            dec!(10_000),
            FinancingType::SinglePayment,
            UserId::new("creator"),
            Utc::now(),
        );
        inv.id = InvestmentId::new("inv-1");
        inv.status = status;
        inv
    }

    fn cashflow(status: CashflowStatus) -> Cashflow {
        let due = d("2026-06-01");
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
            status,
            manager_confirmation: None,
            executive_confirmation: None,
            postponement: None,
            auto_confirmed: false,
        }
    }

    fn assign(user: &str, role: Role, company: Option<&str>) -> RoleAssignment {
        RoleAssignment {
            user_id: UserId::new(user),
            role,
            group_id: group(),
            company_id: company.map(CompanyId::new),
        }
    }

    #[test]
    fn test_creator_can_submit_complete_draft() {
        let inv = investment(InvestmentStatus::Draft);
        let assignments = [assign("creator", Role::Employee, Some("co-1"))];
        let decision = can_perform_investment_action(
            &UserId::new("creator"),
            &group(),
            &assignments,
            &inv,
            &InvestmentAction::Submit,
        );
        assert!(decision.allowed, "{:?}", decision.reason);
        assert_eq!(decision.target_status, InvestmentStatus::Submitted);
    }

    #[test]
    fn test_submit_incomplete_denied() {
        let mut inv = investment(InvestmentStatus::Draft);
        inv.name = String::new();
        let assignments = [assign("creator", Role::Employee, Some("co-1"))];
        let decision = can_perform_investment_action(
            &UserId::new("creator"),
            &group(),
            &assignments,
            &inv,
            &InvestmentAction::Submit,
        );
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("incomplete"));
    }

    #[test]
    fn test_no_role_denied() {
        let inv = investment(InvestmentStatus::Submitted);
        let decision = can_perform_investment_action(
            &UserId::new("stranger"),
            &group(),
            &[],
            &inv,
            &InvestmentAction::Approve,
        );
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("no role"));
    }

    #[test]
    fn test_approve_requires_approver_role() {
        let inv = investment(InvestmentStatus::Submitted);
        let manager = [assign("u-1", Role::Manager, Some("co-1"))];
        let approver = [assign("u-1", Role::Approver, None)];
        let actor = UserId::new("u-1");

        let denied = can_perform_investment_action(
            &actor,
            &group(),
            &manager,
            &inv,
            &InvestmentAction::Approve,
        );
        assert!(!denied.allowed);

        let allowed = can_perform_investment_action(
            &actor,
            &group(),
            &approver,
            &inv,
            &InvestmentAction::Approve,
        );
        assert!(allowed.allowed);

        // Guard monotonicity: only the outcome differs, not the target.
        assert_eq!(denied.target_status, allowed.target_status);
    }

    #[test]
    fn test_approve_draft_denied_regardless_of_role() {
        // No direct draft -> approved edge; even an admin is denied.
        let inv = investment(InvestmentStatus::Draft);
        let assignments = [assign("u-1", Role::Admin, None)];
        let decision = can_perform_investment_action(
            &UserId::new("u-1"),
            &group(),
            &assignments,
            &inv,
            &InvestmentAction::Approve,
        );
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("status Draft"));
    }

    #[test]
    fn test_reject_requires_comment() {
        let inv = investment(InvestmentStatus::Submitted);
        let assignments = [assign("u-1", Role::Approver, None)];
        let actor = UserId::new("u-1");

        let denied = can_perform_investment_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &InvestmentAction::Reject {
                comment: "   ".to_string(),
            },
        );
        assert!(!denied.allowed);

        let allowed = can_perform_investment_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &InvestmentAction::Reject {
                comment: "budget exceeded".to_string(),
            },
        );
        assert!(allowed.allowed);
    }

    #[test]
    fn test_manager_pre_confirms_but_cannot_confirm() {
        let inv = investment(InvestmentStatus::Active);
        let assignments = [assign("mgr", Role::Manager, Some("co-1"))];
        let actor = UserId::new("mgr");
        let today = d("2026-01-15");

        let pre = can_perform_cashflow_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &cashflow(CashflowStatus::Outstanding),
            &CashflowAction::PreConfirm { comment: None },
            today,
        );
        assert!(pre.allowed, "{:?}", pre.reason);
        assert_eq!(pre.target_status, CashflowStatus::PreConfirmed);

        let confirm = can_perform_cashflow_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &cashflow(CashflowStatus::PreConfirmed),
            &CashflowAction::Confirm { comment: None },
            today,
        );
        assert!(!confirm.allowed);
    }

    #[test]
    fn test_pre_confirm_requires_approved_investment() {
        let inv = investment(InvestmentStatus::Submitted);
        let assignments = [assign("mgr", Role::Manager, Some("co-1"))];
        let decision = can_perform_cashflow_action(
            &UserId::new("mgr"),
            &group(),
            &assignments,
            &inv,
            &cashflow(CashflowStatus::Outstanding),
            &CashflowAction::PreConfirm { comment: None },
            d("2026-01-15"),
        );
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("approved"));
    }

    #[test]
    fn test_executive_confirm_same_company_only() {
        let inv = investment(InvestmentStatus::Active);
        let same = [assign("exec", Role::Executive, Some("co-1"))];
        let today = d("2026-01-15");

        let allowed = can_perform_cashflow_action(
            &UserId::new("exec"),
            &group(),
            &same,
            &inv,
            &cashflow(CashflowStatus::PreConfirmed),
            &CashflowAction::Confirm { comment: None },
            today,
        );
        assert!(allowed.allowed, "{:?}", allowed.reason);
    }

    #[test]
    fn test_confirm_requires_pre_confirmed_status() {
        // The transition table is the sole gate on the cashflow's status:
        // Confirm is rejected from Outstanding with the table's reason.
        let inv = investment(InvestmentStatus::Active);
        let assignments = [assign("exec", Role::Executive, Some("co-1"))];
        let decision = can_perform_cashflow_action(
            &UserId::new("exec"),
            &group(),
            &assignments,
            &inv,
            &cashflow(CashflowStatus::Outstanding),
            &CashflowAction::Confirm { comment: None },
            d("2026-01-15"),
        );
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("status Outstanding"));
    }

    #[test]
    fn test_postpone_invariants() {
        let inv = investment(InvestmentStatus::Active);
        let assignments = [assign("mgr", Role::Manager, Some("co-1"))];
        let actor = UserId::new("mgr");
        let today = d("2026-01-15");
        let cf = cashflow(CashflowStatus::Outstanding);

        let past = can_perform_cashflow_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &cf,
            &CashflowAction::Postpone {
                new_date: d("2026-01-01"),
                reason: "supplier delay".to_string(),
            },
            today,
        );
        assert!(!past.allowed);
        assert!(past.reason.unwrap().contains("future"));

        let no_reason = can_perform_cashflow_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &cf,
            &CashflowAction::Postpone {
                new_date: d("2026-03-01"),
                reason: String::new(),
            },
            today,
        );
        assert!(!no_reason.allowed);

        let ok = can_perform_cashflow_action(
            &actor,
            &group(),
            &assignments,
            &inv,
            &cf,
            &CashflowAction::Postpone {
                new_date: d("2026-03-01"),
                reason: "supplier delay".to_string(),
            },
            today,
        );
        assert!(ok.allowed, "{:?}", ok.reason);
        assert_eq!(ok.target_status, CashflowStatus::Postponed);
    }

    #[test]
    fn test_edit_only_drafts() {
        let draft = investment(InvestmentStatus::Draft);
        let active = investment(InvestmentStatus::Active);
        let creator = UserId::new("creator");

        assert!(can_edit_investment(&creator, &[], &draft).allowed);
        assert!(!can_edit_investment(&creator, &[], &active).allowed);

        // Same-company executive may edit someone else's draft.
        let exec = [assign("exec", Role::Executive, Some("co-1"))];
        assert!(can_edit_investment(&UserId::new("exec"), &exec, &draft).allowed);

        // An unrelated employee may not.
        let emp = [assign("emp", Role::Employee, Some("co-1"))];
        assert!(!can_edit_investment(&UserId::new("emp"), &emp, &draft).allowed);
    }

    #[test]
    fn test_view_scoping() {
        let inv = investment(InvestmentStatus::Submitted);

        let cfo = [assign("cfo", Role::Cfo, None)];
        assert!(can_view_investment(&UserId::new("cfo"), &group(), &cfo, &inv));

        let same_company = [assign("emp", Role::Employee, Some("co-1"))];
        assert!(can_view_investment(&UserId::new("emp"), &group(), &same_company, &inv));

        let other_company = [assign("emp2", Role::Employee, Some("co-2"))];
        assert!(!can_view_investment(&UserId::new("emp2"), &group(), &other_company, &inv));
    }
}
