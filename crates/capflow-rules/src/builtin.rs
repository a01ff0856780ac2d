//! Built-in business rules.
//!
//! Event rules fire once, right after the triggering mutation, against the
//! focused entity. Daily rules are re-evaluated per entity by the daily
//! runner, which de-duplicates per day.

use std::collections::BTreeSet;

use capflow_core::types::{
    CashflowStatus, InvestmentStatus, NotificationKind, NotificationPriority, RelatedEntity, Role,
    UserId,
};

use crate::context::RuleContext;
use crate::error::RuleResult;
use crate::rule::{BusinessRule, RuleMatch, RuleMessage, RuleTrigger};

/// Days of lookahead for the payment-due-soon rule.
pub const DUE_SOON_DAYS: i64 = 7;

/// Returns the full built-in rule set.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn BusinessRule>> {
    vec![
        Box::new(InvestmentSubmitted),
        Box::new(InvestmentApproved),
        Box::new(InvestmentRejected),
        Box::new(CashflowNeedsConfirmation),
        Box::new(CashflowPostponed),
        Box::new(PaymentDueSoon),
        Box::new(PaymentOverdue),
        Box::new(MonthlyReportDue),
    ]
}

/// Submission notifies all approval-role holders in the investment's group.
pub struct InvestmentSubmitted;

impl BusinessRule for InvestmentSubmitted {
    fn id(&self) -> &'static str {
        "investment_submitted"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Event
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::InvestmentSubmitted
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .investment
            .filter(|inv| inv.status == InvestmentStatus::Submitted)
            .map(|inv| RuleMatch::related_to(RelatedEntity::Investment(inv.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        let Some(inv) = ctx.investment else {
            return Vec::new();
        };
        match ctx.group_of_company(&inv.company_id) {
            Some(group) => ctx.users_with_role_in_group(Role::Approver, group),
            None => Vec::new(),
        }
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx.investment.map_or("an investment", |inv| inv.name.as_str());
        RuleMessage::new(
            "Investment submitted",
            format!("{name} was submitted and awaits approval"),
        )
    }
}

/// Approval notifies the investment's creator.
pub struct InvestmentApproved;

impl BusinessRule for InvestmentApproved {
    fn id(&self) -> &'static str {
        "investment_approved"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Event
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::InvestmentApproved
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .investment
            .filter(|inv| inv.status == InvestmentStatus::Approved)
            .map(|inv| RuleMatch::related_to(RelatedEntity::Investment(inv.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        ctx.investment
            .map(|inv| vec![inv.created_by.clone()])
            .unwrap_or_default()
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx.investment.map_or("Your investment", |inv| inv.name.as_str());
        RuleMessage::new("Investment approved", format!("{name} was approved"))
    }
}

/// Rejection notifies the investment's creator, with the comment.
pub struct InvestmentRejected;

impl BusinessRule for InvestmentRejected {
    fn id(&self) -> &'static str {
        "investment_rejected"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Event
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::InvestmentRejected
    }

    fn priority(&self) -> NotificationPriority {
        NotificationPriority::High
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .investment
            .filter(|inv| inv.status == InvestmentStatus::Rejected)
            .map(|inv| RuleMatch::related_to(RelatedEntity::Investment(inv.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        ctx.investment
            .map(|inv| vec![inv.created_by.clone()])
            .unwrap_or_default()
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx.investment.map_or("Your investment", |inv| inv.name.as_str());
        let body = match ctx.investment.and_then(|inv| inv.rejection_comment.as_deref()) {
            Some(comment) => format!("{name} was rejected: {comment}"),
            None => format!("{name} was rejected"),
        };
        RuleMessage::new("Investment rejected", body)
    }
}

/// A manager's pre-confirmation notifies the executives scoped to the
/// investment's company, who must give the final confirmation.
pub struct CashflowNeedsConfirmation;

impl BusinessRule for CashflowNeedsConfirmation {
    fn id(&self) -> &'static str {
        "cashflow_needs_confirmation"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Event
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::CashflowNeedsConfirmation
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .cashflow
            .filter(|cf| cf.status == CashflowStatus::PreConfirmed)
            .map(|cf| RuleMatch::related_to(RelatedEntity::Cashflow(cf.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        match ctx.focused_investment() {
            Some(inv) => ctx.users_with_role_for_company(Role::Executive, &inv.company_id),
            None => Vec::new(),
        }
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx
            .focused_investment()
            .map_or("an investment", |inv| inv.name.as_str());
        let due = ctx
            .cashflow
            .map(|cf| cf.effective_due_date().to_string())
            .unwrap_or_default();
        RuleMessage::new(
            "Payment awaits confirmation",
            format!("A payment for {name} due {due} was pre-confirmed and awaits your confirmation"),
        )
    }
}

/// Postponement notifies whichever of the two confirming roles did not
/// perform it.
pub struct CashflowPostponed;

impl BusinessRule for CashflowPostponed {
    fn id(&self) -> &'static str {
        "cashflow_postponed"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Event
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::CashflowPostponed
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .cashflow
            .filter(|cf| cf.status == CashflowStatus::Postponed && cf.postponement.is_some())
            .map(|cf| RuleMatch::related_to(RelatedEntity::Cashflow(cf.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        let Some(inv) = ctx.focused_investment() else {
            return Vec::new();
        };
        let actor = ctx
            .actor
            .or_else(|| ctx.cashflow.and_then(|cf| cf.postponement.as_ref().map(|p| &p.user_id)));
        let actor_is_manager = actor
            .map(|a| ctx.user_has_role_for_company(a, Role::Manager, &inv.company_id))
            .unwrap_or(false);

        let counterpart = if actor_is_manager {
            Role::Executive
        } else {
            Role::Manager
        };
        let mut recipients: BTreeSet<UserId> = ctx
            .users_with_role_for_company(counterpart, &inv.company_id)
            .into_iter()
            .collect();
        // Never notify the actor about their own postponement.
        if let Some(actor) = actor {
            recipients.remove(actor);
        }
        recipients.into_iter().collect()
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx
            .focused_investment()
            .map_or("an investment", |inv| inv.name.as_str());
        let body = match ctx.cashflow.and_then(|cf| cf.postponement.as_ref()) {
            Some(p) => format!(
                "A payment for {name} was postponed from {} ({})",
                p.original_due_date, p.reason
            ),
            None => format!("A payment for {name} was postponed"),
        };
        RuleMessage::new("Payment postponed", body)
    }
}

/// A payment is due within [`DUE_SOON_DAYS`]; reminds the company's
/// managers while it still awaits pre-confirmation.
pub struct PaymentDueSoon;

impl BusinessRule for PaymentDueSoon {
    fn id(&self) -> &'static str {
        "payment_due_soon"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Daily
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::PaymentDueSoon
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .cashflow
            .filter(|cf| {
                let days = ctx.today.days_until(&cf.effective_due_date());
                cf.status == CashflowStatus::Outstanding && days >= 0 && days <= DUE_SOON_DAYS
            })
            .map(|cf| RuleMatch::related_to(RelatedEntity::Cashflow(cf.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        match ctx.focused_investment() {
            Some(inv) => ctx.users_with_role_for_company(Role::Manager, &inv.company_id),
            None => Vec::new(),
        }
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx
            .focused_investment()
            .map_or("an investment", |inv| inv.name.as_str());
        let due = ctx
            .cashflow
            .map(|cf| cf.effective_due_date().to_string())
            .unwrap_or_default();
        RuleMessage::new(
            "Payment due soon",
            format!("A payment for {name} is due on {due}"),
        )
    }
}

/// A payment's effective due date has passed without final confirmation;
/// alerts both confirming roles.
pub struct PaymentOverdue;

impl BusinessRule for PaymentOverdue {
    fn id(&self) -> &'static str {
        "payment_overdue"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Daily
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::PaymentOverdue
    }

    fn priority(&self) -> NotificationPriority {
        NotificationPriority::High
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        Ok(ctx
            .cashflow
            .filter(|cf| {
                matches!(
                    cf.status,
                    CashflowStatus::Outstanding | CashflowStatus::PreConfirmed
                ) && cf.effective_due_date() < ctx.today
            })
            .map(|cf| RuleMatch::related_to(RelatedEntity::Cashflow(cf.id.clone()))))
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        let Some(inv) = ctx.focused_investment() else {
            return Vec::new();
        };
        let set: BTreeSet<UserId> = ctx
            .users_with_role_for_company(Role::Manager, &inv.company_id)
            .into_iter()
            .chain(ctx.users_with_role_for_company(Role::Executive, &inv.company_id))
            .collect();
        set.into_iter().collect()
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        let name = ctx
            .focused_investment()
            .map_or("an investment", |inv| inv.name.as_str());
        let due = ctx
            .cashflow
            .map(|cf| cf.effective_due_date().to_string())
            .unwrap_or_default();
        RuleMessage::new(
            "Payment overdue",
            format!("A payment for {name} was due on {due} and is not confirmed"),
        )
    }
}

/// On the first of each month, reminds CFO-role holders that the monthly
/// payment report is due.
pub struct MonthlyReportDue;

impl BusinessRule for MonthlyReportDue {
    fn id(&self) -> &'static str {
        "monthly_report_due"
    }

    fn trigger(&self) -> RuleTrigger {
        RuleTrigger::Daily
    }

    fn kind(&self) -> NotificationKind {
        NotificationKind::MonthlyReportDue
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>> {
        if ctx.today.day() == 1 {
            Ok(Some(RuleMatch::unrelated()))
        } else {
            Ok(None)
        }
    }

    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId> {
        let set: BTreeSet<UserId> = ctx
            .groups
            .iter()
            .flat_map(|g| ctx.users_with_role_in_group(Role::Cfo, &g.id))
            .collect();
        set.into_iter().collect()
    }

    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage {
        RuleMessage::new(
            "Monthly report due",
            format!("The payment report for {} is due", ctx.today),
        )
    }
}
