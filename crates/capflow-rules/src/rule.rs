//! The business-rule abstraction.

use capflow_core::types::{NotificationKind, NotificationPriority, RelatedEntity, UserId};

use crate::context::RuleContext;
use crate::error::RuleResult;

/// When a rule is meant to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTrigger {
    /// Re-evaluated once per day (or on session start) across the full
    /// entity set. Callers are responsible for same-day de-duplication.
    Daily,
    /// Evaluated once, immediately after the triggering mutation, against
    /// the single affected entity.
    Event,
}

/// A positive rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// The entity the resulting notifications link to.
    pub related: Option<RelatedEntity>,
}

impl RuleMatch {
    /// A match related to the given entity.
    #[must_use]
    pub fn related_to(entity: RelatedEntity) -> Self {
        Self {
            related: Some(entity),
        }
    }

    /// A match with no related entity.
    #[must_use]
    pub fn unrelated() -> Self {
        Self { related: None }
    }
}

/// Title and body of the notifications a rule produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMessage {
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
}

impl RuleMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A registered business rule.
///
/// Each rule is a tuple of trigger category, notification kind/priority, a
/// predicate, a recipient resolver, and a message formatter. All three
/// evaluation methods receive the same context, so a rule that triggered
/// formats its message from the entity it matched.
pub trait BusinessRule: Send + Sync {
    /// Stable rule identifier, used for targeted re-evaluation.
    fn id(&self) -> &'static str;

    /// Daily or event-driven.
    fn trigger(&self) -> RuleTrigger;

    /// The notification kind this rule produces.
    fn kind(&self) -> NotificationKind;

    /// The priority of produced notifications.
    fn priority(&self) -> NotificationPriority {
        NotificationPriority::Normal
    }

    /// Decides whether the rule fires for the given context.
    ///
    /// Returns `Ok(None)` when the rule does not apply. An `Err` is treated
    /// as a per-rule failure and isolated by the engine.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<Option<RuleMatch>>;

    /// Resolves the recipients for a fired rule.
    fn recipients(&self, ctx: &RuleContext<'_>) -> Vec<UserId>;

    /// Formats the notification title and body.
    fn message(&self, ctx: &RuleContext<'_>) -> RuleMessage;
}
