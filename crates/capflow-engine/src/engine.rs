//! The workflow engine.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use capflow_core::types::{
    Cashflow, CashflowId, CashflowStatus, CompanyId, Confirmation, FinancingType, Investment,
    InvestmentId, MonthBucket, Notification, NotificationId, PaymentStructure, Postponement,
    UserId,
};
use capflow_rules::{already_notified_today, RuleContext, RuleEngine};
use capflow_schedule::generator::{self, Generated};
use capflow_store::{
    CashflowFilter, InvestmentFilter, MemoryStore, NotificationFilter, Stores,
};
use capflow_workflow::guards::{
    self, CashflowAction, GuardDecision, InvestmentAction,
};
use capflow_workflow::{cashflow as cashflow_machine, investment as investment_machine};

use crate::clock::{Clock, SystemClock};
use crate::directory::Directory;
use crate::error::{EngineError, EngineResult};

/// Result of a guarded mutation: the updated record plus the notifications
/// the event rules produced (already persisted).
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// The updated record.
    pub record: T,
    /// Notifications created by the event rules.
    pub notifications: Vec<Notification>,
}

/// The single writer over the workflow state.
///
/// Every mutation goes guard -> status machine -> persist -> event rules,
/// in that order, so a denied or invalid action leaves no partial state.
pub struct Engine {
    stores: Stores,
    directory: Directory,
    rules: RuleEngine,
    clock: Box<dyn Clock>,
}

impl Engine {
    /// Creates an engine with the built-in rule set and the system clock.
    #[must_use]
    pub fn new(stores: Stores, directory: Directory) -> Self {
        Self {
            stores,
            directory,
            rules: RuleEngine::with_default_rules(),
            clock: Box::new(SystemClock),
        }
    }

    /// Creates an engine over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(directory: Directory) -> Self {
        Self::new(Stores::from_single(Arc::new(MemoryStore::new())), directory)
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the rule engine.
    #[must_use]
    pub fn with_rule_engine(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// The directory the engine authorizes against.
    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    // ---------------------------------------------------------------------
    // Investments
    // ---------------------------------------------------------------------

    /// Creates a draft investment for `actor`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownCompany` if the directory does not know
    /// the company.
    pub fn create_draft(
        &self,
        actor: &UserId,
        company_id: CompanyId,
        name: impl Into<String>,
        category: impl Into<String>,
        total_amount: Decimal,
        financing_type: FinancingType,
        payment_structure: Option<PaymentStructure>,
    ) -> EngineResult<Investment> {
        if self.directory.company(&company_id).is_none() {
            return Err(EngineError::UnknownCompany {
                id: company_id.as_str().to_string(),
            });
        }

        let mut draft = Investment::new_draft(
            company_id,
            name,
            category,
            total_amount,
            financing_type,
            actor.clone(),
            self.clock.now(),
        );
        if let Some(structure) = payment_structure {
            draft = draft.with_payment_structure(structure);
        }
        Ok(self.stores.investments.create_investment(draft)?)
    }

    /// Updates a draft investment's editable fields.
    ///
    /// Identity, status, creator, and creation time are preserved from the
    /// stored record regardless of what the caller passes.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` if `actor` may not edit the record.
    pub fn update_investment(
        &self,
        actor: &UserId,
        updated: Investment,
    ) -> EngineResult<Investment> {
        let current = self.require_investment(&updated.id)?;
        let access = guards::can_edit_investment(actor, &self.directory.assignments, &current);
        if !access.allowed {
            return Err(EngineError::denied(access.reason.unwrap_or_default()));
        }

        let record = Investment {
            id: current.id,
            status: current.status,
            created_by: current.created_by,
            created_at: current.created_at,
            rejection_comment: current.rejection_comment,
            updated_at: self.clock.now(),
            ..updated
        };
        self.stores.investments.put_investment(&record)?;
        Ok(record)
    }

    /// Deletes a draft investment together with its cashflows.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` if `actor` may not delete the record.
    pub fn delete_investment(&self, actor: &UserId, id: &InvestmentId) -> EngineResult<()> {
        let investment = self.require_investment(id)?;
        let access = guards::can_delete_investment(actor, &self.directory.assignments, &investment);
        if !access.allowed {
            return Err(EngineError::denied(access.reason.unwrap_or_default()));
        }
        self.stores.cashflows.delete_for_investment(id)?;
        self.stores.investments.delete_investment(id)?;
        log::info!("investment {id} deleted by {actor}");
        Ok(())
    }

    /// Returns an investment if `actor` may view it.
    ///
    /// An invisible record reads as absent, the same as a missing one.
    pub fn investment(&self, actor: &UserId, id: &InvestmentId) -> EngineResult<Investment> {
        let investment = self.require_investment(id)?;
        let group = self.require_group(&investment.company_id)?;
        if !guards::can_view_investment(actor, &group, &self.directory.assignments, &investment) {
            return Err(EngineError::not_found("investment", id.as_str()));
        }
        Ok(investment)
    }

    /// Lists investments matching the filter that `actor` may view.
    pub fn list_investments(
        &self,
        actor: &UserId,
        filter: &InvestmentFilter,
    ) -> EngineResult<Vec<Investment>> {
        let items = self.stores.investments.list_investments(filter)?;
        Ok(items
            .into_iter()
            .filter(|inv| {
                self.directory
                    .group_of_company(&inv.company_id)
                    .map_or(false, |group| {
                        guards::can_view_investment(
                            actor,
                            group,
                            &self.directory.assignments,
                            inv,
                        )
                    })
            })
            .collect())
    }

    /// Performs a guarded lifecycle action on an investment.
    ///
    /// Approval flips the investment's planned cashflows to outstanding, so
    /// they enter the confirmation flow immediately.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` with the guard's reason if the action
    /// is not permitted.
    pub fn apply_investment_action(
        &self,
        actor: &UserId,
        id: &InvestmentId,
        action: &InvestmentAction,
    ) -> EngineResult<Outcome<Investment>> {
        let mut investment = self.require_investment(id)?;
        let group = self.require_group(&investment.company_id)?;

        let decision = guards::can_perform_investment_action(
            actor,
            &group,
            &self.directory.assignments,
            &investment,
            action,
        );
        let target = self.check(decision)?;

        investment.status = investment_machine::transition(investment.status, target)?;
        investment.updated_at = self.clock.now();
        match action {
            InvestmentAction::Reject { comment } => {
                investment.rejection_comment = Some(comment.clone());
            }
            InvestmentAction::Submit => {
                investment.rejection_comment = None;
            }
            _ => {}
        }
        self.stores.investments.put_investment(&investment)?;

        if matches!(
            action,
            InvestmentAction::Approve | InvestmentAction::Activate
        ) {
            self.release_planned_cashflows(id)?;
        }

        log::info!("investment {id}: {} by {actor}", action.name());
        let notifications = self.fire_event_rules(&investment, None, actor)?;
        Ok(Outcome {
            record: investment,
            notifications,
        })
    }

    // ---------------------------------------------------------------------
    // Cashflows
    // ---------------------------------------------------------------------

    /// Performs a guarded confirmation-flow action on a cashflow.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` with the guard's reason if the action
    /// is not permitted.
    pub fn apply_cashflow_action(
        &self,
        actor: &UserId,
        id: &CashflowId,
        action: &CashflowAction,
    ) -> EngineResult<Outcome<Cashflow>> {
        let mut cashflow = self.require_cashflow(id)?;
        let investment = self.require_investment(&cashflow.investment_id)?;
        let group = self.require_group(&investment.company_id)?;
        let now = self.clock.now();

        let decision = guards::can_perform_cashflow_action(
            actor,
            &group,
            &self.directory.assignments,
            &investment,
            &cashflow,
            action,
            self.clock.today(),
        );
        let target = self.check(decision)?;

        cashflow.status = cashflow_machine::transition(cashflow.status, target)?;
        match action {
            CashflowAction::PreConfirm { comment } => {
                cashflow.manager_confirmation = Some(Confirmation {
                    user_id: actor.clone(),
                    at: now,
                    comment: comment.clone(),
                });
            }
            CashflowAction::Confirm { comment } => {
                cashflow.executive_confirmation = Some(Confirmation {
                    user_id: actor.clone(),
                    at: now,
                    comment: comment.clone(),
                });
            }
            CashflowAction::SendBack { .. } => {
                // Back to the manager: the pre-confirmation no longer stands.
                cashflow.manager_confirmation = None;
            }
            CashflowAction::Postpone { new_date, reason } => {
                cashflow.postponement = Some(Postponement {
                    original_due_date: cashflow.effective_due_date(),
                    user_id: actor.clone(),
                    at: now,
                    reason: reason.clone(),
                });
                cashflow.custom_due_date = Some(*new_date);
                cashflow.rebucket();
            }
            CashflowAction::Cancel | CashflowAction::MakeOutstanding => {}
        }
        self.stores.cashflows.put_cashflow(&cashflow)?;

        log::info!("cashflow {id}: {} by {actor}", action.name());
        let notifications = self.fire_event_rules(&investment, Some(&cashflow), actor)?;
        Ok(Outcome {
            record: cashflow,
            notifications,
        })
    }

    /// Lists the cashflows of an investment `actor` may view.
    pub fn cashflows_for(
        &self,
        actor: &UserId,
        investment_id: &InvestmentId,
    ) -> EngineResult<Vec<Cashflow>> {
        self.investment(actor, investment_id)?;
        Ok(self
            .stores
            .cashflows
            .list_cashflows(&CashflowFilter::by_investment(investment_id.clone()))?)
    }

    /// Lists the cashflows falling into a month bucket, restricted to
    /// investments `actor` may view.
    pub fn calendar(&self, actor: &UserId, bucket: MonthBucket) -> EngineResult<Vec<Cashflow>> {
        let visible: HashSet<InvestmentId> = self
            .list_investments(actor, &InvestmentFilter::default())?
            .into_iter()
            .map(|inv| inv.id)
            .collect();
        let cashflows = self
            .stores
            .cashflows
            .list_cashflows(&CashflowFilter::by_bucket(bucket))?;
        Ok(cashflows
            .into_iter()
            .filter(|cf| visible.contains(&cf.investment_id))
            .collect())
    }

    // ---------------------------------------------------------------------
    // Schedule generation
    // ---------------------------------------------------------------------

    /// Expands a payment structure without touching storage.
    pub fn preview_schedule(
        &self,
        financing_type: FinancingType,
        structure: &PaymentStructure,
        total_amount: Decimal,
    ) -> EngineResult<Generated> {
        Ok(generator::preview(financing_type, structure, total_amount)?)
    }

    /// Regenerates an investment's cashflow schedule, replacing the stored
    /// set wholesale. Manual confirmations and postponements on the old set
    /// do not survive.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` if `actor` may not edit the record, or
    /// the generator's error when the structure is missing or mismatched.
    pub fn regenerate_cashflows(
        &self,
        actor: &UserId,
        id: &InvestmentId,
    ) -> EngineResult<Generated> {
        let investment = self.require_investment(id)?;
        let access = guards::can_edit_investment(actor, &self.directory.assignments, &investment);
        if !access.allowed {
            return Err(EngineError::denied(access.reason.unwrap_or_default()));
        }

        let mut generated = generator::generate(&investment)?;
        for warning in &generated.warnings {
            log::warn!("investment {id}: {warning}");
        }
        generated.cashflows = self
            .stores
            .cashflows
            .replace_for_investment(id, generated.cashflows)?;
        Ok(generated)
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    /// Runs the daily rules over all stored cashflows and persists the
    /// notifications not already produced today.
    pub fn run_daily_rules(&self) -> EngineResult<Vec<Notification>> {
        let today = self.clock.today();
        let now = self.clock.now();
        let investments = self
            .stores
            .investments
            .list_investments(&InvestmentFilter::default())?;
        let cashflows = self
            .stores
            .cashflows
            .list_cashflows(&CashflowFilter::default())?;
        let existing = self
            .stores
            .notifications
            .list_notifications(&NotificationFilter::default())?;

        let base = RuleContext::new(
            today,
            now,
            &investments,
            &self.directory.users,
            &self.directory.assignments,
            &self.directory.companies,
            &self.directory.groups,
        );

        let mut candidates = self.rules.evaluate_daily_rules(&base);
        for cashflow in &cashflows {
            candidates.extend(
                self.rules
                    .evaluate_daily_rules(&base.with_cashflow(cashflow)),
            );
        }

        // Entity-independent rules fire in every context; keep one copy,
        // then drop anything already produced earlier today.
        let mut seen = HashSet::new();
        let fresh: Vec<Notification> = candidates
            .into_iter()
            .filter(|n| seen.insert((n.recipient.clone(), n.kind, n.related.clone())))
            .filter(|n| !already_notified_today(&existing, n.kind, n.related.as_ref(), today))
            .collect();

        if fresh.is_empty() {
            return Ok(Vec::new());
        }
        let stored = self.stores.notifications.create_notifications(fresh)?;
        log::info!("daily rules produced {} notifications", stored.len());
        Ok(stored)
    }

    /// Lists `actor`'s unread notifications, oldest first.
    pub fn unread_notifications(&self, actor: &UserId) -> EngineResult<Vec<Notification>> {
        Ok(self
            .stores
            .notifications
            .list_notifications(&NotificationFilter::unread_for(actor.clone()))?)
    }

    /// Marks one of `actor`'s notifications read.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Denied` if the notification is addressed to
    /// someone else.
    pub fn mark_notification_read(
        &self,
        actor: &UserId,
        id: &NotificationId,
    ) -> EngineResult<()> {
        let notification = self
            .stores
            .notifications
            .get_notification(id)?
            .ok_or_else(|| EngineError::not_found("notification", id.as_str()))?;
        if &notification.recipient != actor {
            return Err(EngineError::denied("notification belongs to another user"));
        }
        Ok(self.stores.notifications.mark_read(id)?)
    }

    /// Deletes all of `actor`'s notifications. Returns the removed count.
    pub fn clear_notifications(&self, actor: &UserId) -> EngineResult<u64> {
        Ok(self.stores.notifications.delete_for_recipient(actor)?)
    }

    /// Deletes notifications created before the cutoff. Returns the removed
    /// count.
    pub fn purge_notifications_older_than(&self, cutoff: DateTime<Utc>) -> EngineResult<u64> {
        Ok(self.stores.notifications.purge_older_than(cutoff)?)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn require_investment(&self, id: &InvestmentId) -> EngineResult<Investment> {
        self.stores
            .investments
            .get_investment(id)?
            .ok_or_else(|| EngineError::not_found("investment", id.as_str()))
    }

    fn require_cashflow(&self, id: &CashflowId) -> EngineResult<Cashflow> {
        self.stores
            .cashflows
            .get_cashflow(id)?
            .ok_or_else(|| EngineError::not_found("cashflow", id.as_str()))
    }

    fn require_group(&self, company: &CompanyId) -> EngineResult<capflow_core::types::GroupId> {
        self.directory
            .group_of_company(company)
            .cloned()
            .ok_or_else(|| EngineError::UnknownCompany {
                id: company.as_str().to_string(),
            })
    }

    fn check<S>(&self, decision: GuardDecision<S>) -> EngineResult<S> {
        if decision.allowed {
            Ok(decision.target_status)
        } else {
            Err(EngineError::denied(decision.reason.unwrap_or_default()))
        }
    }

    /// Planned cashflows enter the confirmation flow once the investment is
    /// approved. Auto-confirmed rates (contractually fixed lease payments)
    /// skip the manual manager step and land pre-confirmed.
    fn release_planned_cashflows(&self, id: &InvestmentId) -> EngineResult<()> {
        let filter = CashflowFilter {
            investment_id: Some(id.clone()),
            status: Some(CashflowStatus::Planned),
            ..Default::default()
        };
        for mut cashflow in self.stores.cashflows.list_cashflows(&filter)? {
            cashflow.status =
                cashflow_machine::transition(cashflow.status, CashflowStatus::Outstanding)?;
            if cashflow.auto_confirmed {
                cashflow.status =
                    cashflow_machine::transition(cashflow.status, CashflowStatus::PreConfirmed)?;
            }
            self.stores.cashflows.put_cashflow(&cashflow)?;
        }
        Ok(())
    }

    fn fire_event_rules(
        &self,
        investment: &Investment,
        cashflow: Option<&Cashflow>,
        actor: &UserId,
    ) -> EngineResult<Vec<Notification>> {
        let investments = std::slice::from_ref(investment);
        let mut ctx = RuleContext::new(
            self.clock.today(),
            self.clock.now(),
            investments,
            &self.directory.users,
            &self.directory.assignments,
            &self.directory.companies,
            &self.directory.groups,
        )
        .with_actor(actor);
        ctx = match cashflow {
            Some(cf) => ctx.with_cashflow(cf),
            None => ctx.with_investment(investment),
        };

        let produced = self.rules.evaluate_event_rules(&ctx);
        if produced.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.stores.notifications.create_notifications(produced)?)
    }
}
