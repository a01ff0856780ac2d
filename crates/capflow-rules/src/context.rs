//! Rule evaluation context.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use capflow_core::types::{
    Cashflow, Company, CompanyId, Date, Group, GroupId, Investment, Role, RoleAssignment, User,
    UserId,
};

/// The bundle of current-date, directory, and entity data a business rule
/// evaluates against.
///
/// The current date is injected, never read from the system clock, so rule
/// evaluation is deterministic in tests.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The evaluation date.
    pub today: Date,
    /// The evaluation timestamp (used for notification creation times).
    pub now: DateTime<Utc>,
    /// The investment an event rule focuses on, if any.
    pub investment: Option<&'a Investment>,
    /// The cashflow an event or per-entity daily rule focuses on, if any.
    pub cashflow: Option<&'a Cashflow>,
    /// Full investment set (for cross-entity lookups).
    pub investments: &'a [Investment],
    /// Full user directory.
    pub users: &'a [User],
    /// Full role-assignment list.
    pub assignments: &'a [RoleAssignment],
    /// Full company list.
    pub companies: &'a [Company],
    /// Full group list.
    pub groups: &'a [Group],
    /// The user whose action produced the event, if any.
    pub actor: Option<&'a UserId>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context over the given directory data with no focused
    /// entity.
    #[must_use]
    pub fn new(
        today: Date,
        now: DateTime<Utc>,
        investments: &'a [Investment],
        users: &'a [User],
        assignments: &'a [RoleAssignment],
        companies: &'a [Company],
        groups: &'a [Group],
    ) -> Self {
        Self {
            today,
            now,
            investment: None,
            cashflow: None,
            investments,
            users,
            assignments,
            companies,
            groups,
            actor: None,
        }
    }

    /// Focuses the context on an investment.
    #[must_use]
    pub fn with_investment(mut self, investment: &'a Investment) -> Self {
        self.investment = Some(investment);
        self
    }

    /// Focuses the context on a cashflow.
    #[must_use]
    pub fn with_cashflow(mut self, cashflow: &'a Cashflow) -> Self {
        self.cashflow = Some(cashflow);
        self
    }

    /// Records the acting user.
    #[must_use]
    pub fn with_actor(mut self, actor: &'a UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Looks up the investment a focused cashflow belongs to, preferring
    /// the explicitly focused investment.
    #[must_use]
    pub fn focused_investment(&self) -> Option<&'a Investment> {
        if let Some(inv) = self.investment {
            return Some(inv);
        }
        let cashflow = self.cashflow?;
        self.investments
            .iter()
            .find(|inv| inv.id == cashflow.investment_id)
    }

    /// Returns the group a company belongs to.
    #[must_use]
    pub fn group_of_company(&self, company: &CompanyId) -> Option<&'a GroupId> {
        self.companies
            .iter()
            .find(|c| &c.id == company)
            .map(|c| &c.group_id)
    }

    /// Returns the users holding `role` in `group`, deduplicated.
    #[must_use]
    pub fn users_with_role_in_group(&self, role: Role, group: &GroupId) -> Vec<UserId> {
        let set: BTreeSet<UserId> = self
            .assignments
            .iter()
            .filter(|a| a.role == role && &a.group_id == group)
            .map(|a| a.user_id.clone())
            .collect();
        set.into_iter().collect()
    }

    /// Returns the users holding `role` with scope covering `company`,
    /// deduplicated.
    #[must_use]
    pub fn users_with_role_for_company(&self, role: Role, company: &CompanyId) -> Vec<UserId> {
        let group = self.group_of_company(company);
        let set: BTreeSet<UserId> = self
            .assignments
            .iter()
            .filter(|a| {
                a.role == role
                    && a.covers_company(company)
                    && group.map_or(true, |g| &a.group_id == g)
            })
            .map(|a| a.user_id.clone())
            .collect();
        set.into_iter().collect()
    }

    /// Returns true if `user` holds `role` with scope covering `company`.
    #[must_use]
    pub fn user_has_role_for_company(&self, user: &UserId, role: Role, company: &CompanyId) -> bool {
        self.assignments
            .iter()
            .any(|a| &a.user_id == user && a.role == role && a.covers_company(company))
    }

    /// Returns the display name of a user, falling back to the raw id.
    #[must_use]
    pub fn user_name(&self, user: &UserId) -> String {
        self.users
            .iter()
            .find(|u| &u.id == user)
            .map_or_else(|| user.to_string(), |u| u.name.clone())
    }
}
