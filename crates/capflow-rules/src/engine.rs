//! Rule registry and evaluation engine.

use capflow_core::types::{Date, Notification, NotificationKind, RelatedEntity};

use crate::builtin;
use crate::context::RuleContext;
use crate::error::{RuleError, RuleResult};
use crate::rule::{BusinessRule, RuleTrigger};

/// Registry of business rules.
#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<Box<dyn BusinessRule>>,
}

impl RuleEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates an engine with the built-in rule set registered.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        for rule in builtin::default_rules() {
            engine.register(rule);
        }
        engine
    }

    /// Registers a rule.
    pub fn register(&mut self, rule: Box<dyn BusinessRule>) {
        self.rules.push(rule);
    }

    /// Returns the ids of all registered rules.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Runs every registered rule against the context.
    ///
    /// For each rule that triggers, recipients are resolved and one
    /// notification per recipient is produced. A failing rule is logged
    /// and skipped; it never aborts the remaining rules.
    #[must_use]
    pub fn evaluate_all(&self, ctx: &RuleContext<'_>) -> Vec<Notification> {
        self.evaluate_where(ctx, |_| true)
    }

    /// Runs only the event-triggered rules.
    #[must_use]
    pub fn evaluate_event_rules(&self, ctx: &RuleContext<'_>) -> Vec<Notification> {
        self.evaluate_where(ctx, |r| r.trigger() == RuleTrigger::Event)
    }

    /// Runs only the daily rules.
    #[must_use]
    pub fn evaluate_daily_rules(&self, ctx: &RuleContext<'_>) -> Vec<Notification> {
        self.evaluate_where(ctx, |r| r.trigger() == RuleTrigger::Daily)
    }

    /// Runs a single named rule, for targeted re-evaluation.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::UnknownRule` if no rule has the given id, or the
    /// rule's own evaluation error.
    pub fn evaluate_rule(&self, id: &str, ctx: &RuleContext<'_>) -> RuleResult<Vec<Notification>> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| RuleError::unknown_rule(id))?;

        match rule.evaluate(ctx)? {
            Some(matched) => Ok(fan_out(rule.as_ref(), ctx, matched.related)),
            None => Ok(Vec::new()),
        }
    }

    fn evaluate_where(
        &self,
        ctx: &RuleContext<'_>,
        filter: impl Fn(&dyn BusinessRule) -> bool,
    ) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for rule in self.rules.iter().filter(|r| filter(r.as_ref())) {
            match rule.evaluate(ctx) {
                Ok(Some(matched)) => {
                    notifications.extend(fan_out(rule.as_ref(), ctx, matched.related));
                }
                Ok(None) => {}
                Err(err) => {
                    // One bad rule must not block the rest.
                    log::warn!("rule {} failed to evaluate: {err}", rule.id());
                }
            }
        }
        notifications
    }
}

/// One notification per resolved recipient, all sharing the same message
/// and related entity.
fn fan_out(
    rule: &dyn BusinessRule,
    ctx: &RuleContext<'_>,
    related: Option<RelatedEntity>,
) -> Vec<Notification> {
    let message = rule.message(ctx);
    rule.recipients(ctx)
        .into_iter()
        .map(|recipient| {
            Notification::new(
                recipient,
                rule.kind(),
                message.title.clone(),
                message.body.clone(),
                rule.priority(),
                related.clone(),
                ctx.now,
            )
        })
        .collect()
}

/// Returns true if a notification of this kind for this entity was already
/// created on `today`.
///
/// Daily rules must not fire twice for the same entity within the same day;
/// callers check this against the persisted notification set before
/// inserting new ones. Read and unread notifications both count.
#[must_use]
pub fn already_notified_today(
    existing: &[Notification],
    kind: NotificationKind,
    related: Option<&RelatedEntity>,
    today: Date,
) -> bool {
    existing.iter().any(|n| {
        n.kind == kind
            && n.related.as_ref() == related
            && n.created_at.date_naive() == today.as_naive_date()
    })
}
