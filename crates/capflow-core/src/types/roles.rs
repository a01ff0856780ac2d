//! Roles, role assignments, and directory records.
//!
//! The core never authenticates. Guards and rules receive an already
//! resolved actor plus the full assignment list and authorize from there.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CompanyId, GroupId, UserId};

/// A workflow role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee; may draft and submit requests.
    Employee,
    /// Operations manager; pre-confirms cashflows for their company.
    Manager,
    /// Group-level approver for investment requests.
    Approver,
    /// Company executive; confirms cashflows after pre-confirmation.
    Executive,
    /// Group CFO; oversight across all companies.
    Cfo,
    /// System administration.
    Admin,
}

impl Role {
    /// Returns true for roles whose visibility spans the whole group.
    #[must_use]
    pub fn is_group_scoped(&self) -> bool {
        matches!(self, Role::Approver | Role::Cfo | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::Approver => "Approver",
            Role::Executive => "Executive",
            Role::Cfo => "CFO",
            Role::Admin => "Admin",
        };
        write!(f, "{name}")
    }
}

/// One (user, role, group, optional company) tuple.
///
/// Company-scoped assignments restrict actions and visibility to that
/// company; group-scoped assignments span all companies in the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Assigned role.
    pub role: Role,
    /// Group the assignment belongs to.
    pub group_id: GroupId,
    /// Company scope; `None` means the whole group.
    pub company_id: Option<CompanyId>,
}

impl RoleAssignment {
    /// Creates a company-scoped assignment.
    #[must_use]
    pub fn company_scoped(
        user_id: UserId,
        role: Role,
        group_id: GroupId,
        company_id: CompanyId,
    ) -> Self {
        Self {
            user_id,
            role,
            group_id,
            company_id: Some(company_id),
        }
    }

    /// Creates a group-scoped assignment.
    #[must_use]
    pub fn group_scoped(user_id: UserId, role: Role, group_id: GroupId) -> Self {
        Self {
            user_id,
            role,
            group_id,
            company_id: None,
        }
    }

    /// Returns true if this assignment covers the given company.
    #[must_use]
    pub fn covers_company(&self, company: &CompanyId) -> bool {
        match &self.company_id {
            Some(scoped) => scoped == company,
            None => true,
        }
    }
}

/// A user directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
}

/// A company within a corporate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier.
    pub id: CompanyId,
    /// Company name.
    pub name: String,
    /// Owning group.
    pub group_id: GroupId,
}

/// A corporate group of companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Group name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_scope() {
        let assignment = RoleAssignment::company_scoped(
            UserId::new("u-1"),
            Role::Manager,
            GroupId::new("g-1"),
            CompanyId::new("co-1"),
        );
        assert!(assignment.covers_company(&CompanyId::new("co-1")));
        assert!(!assignment.covers_company(&CompanyId::new("co-2")));
    }

    #[test]
    fn test_group_scope_covers_all_companies() {
        let assignment =
            RoleAssignment::group_scoped(UserId::new("u-1"), Role::Cfo, GroupId::new("g-1"));
        assert!(assignment.covers_company(&CompanyId::new("co-1")));
        assert!(assignment.covers_company(&CompanyId::new("co-2")));
    }
}
