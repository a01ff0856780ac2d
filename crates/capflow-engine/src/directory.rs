//! Organizational directory: users, companies, groups, role assignments.
//!
//! The engine never authenticates; it receives a directory resolved by the
//! surrounding application and authorizes against it.

use capflow_core::types::{Company, CompanyId, Group, GroupId, RoleAssignment, User, UserId};

/// The full organizational context the engine authorizes against.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    /// Known users.
    pub users: Vec<User>,
    /// Role assignments.
    pub assignments: Vec<RoleAssignment>,
    /// Companies.
    pub companies: Vec<Company>,
    /// Corporate groups.
    pub groups: Vec<Group>,
}

impl Directory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the company record, if known.
    #[must_use]
    pub fn company(&self, id: &CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| &c.id == id)
    }

    /// Returns the group a company belongs to.
    #[must_use]
    pub fn group_of_company(&self, id: &CompanyId) -> Option<&GroupId> {
        self.company(id).map(|c| &c.group_id)
    }

    /// Returns the user record, if known.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }
}
