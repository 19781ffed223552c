//! Closed role and capability enums for workflow authorization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role within an organization.
///
/// The role set is closed: unknown role strings fail to parse rather
/// than falling through to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full tenant administration.
    Admin,
    /// Project lead: decides allocations, amends budgets, manages alerts.
    TeamLeader,
    /// Site user: records and submits costs.
    User,
}

/// An action class gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create cost allocations.
    RecordCost,
    /// Submit draft allocations for approval.
    SubmitCost,
    /// Approve or reject pending allocations.
    DecideCost,
    /// Create budget amendments and change orders.
    AmendBudget,
    /// Acknowledge and resolve budget alerts.
    ManageAlerts,
    /// Create and update projects, line items, and materials.
    ManageProjects,
}

impl Role {
    /// Parses a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "team_leader" => Some(Self::TeamLeader),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::TeamLeader => "team_leader",
            Self::User => "user",
        }
    }

    /// Whether this role may exercise the given capability.
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::RecordCost | Capability::SubmitCost => true,
            Capability::DecideCost
            | Capability::AmendBudget
            | Capability::ManageAlerts
            | Capability::ManageProjects => matches!(self, Self::Admin | Self::TeamLeader),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Capability {
    /// Returns the string representation of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RecordCost => "record_cost",
            Self::SubmitCost => "submit_cost",
            Self::DecideCost => "decide_cost",
            Self::AmendBudget => "amend_budget",
            Self::ManageAlerts => "manage_alerts",
            Self::ManageProjects => "manage_projects",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("TEAM_LEADER"), Some(Role::TeamLeader));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::TeamLeader.as_str(), "team_leader");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_everyone_can_record_and_submit() {
        for role in [Role::Admin, Role::TeamLeader, Role::User] {
            assert!(role.allows(Capability::RecordCost));
            assert!(role.allows(Capability::SubmitCost));
        }
    }

    #[test]
    fn test_only_leads_decide_costs() {
        assert!(Role::Admin.allows(Capability::DecideCost));
        assert!(Role::TeamLeader.allows(Capability::DecideCost));
        assert!(!Role::User.allows(Capability::DecideCost));
    }

    #[test]
    fn test_user_cannot_manage() {
        assert!(!Role::User.allows(Capability::AmendBudget));
        assert!(!Role::User.allows(Capability::ManageAlerts));
        assert!(!Role::User.allows(Capability::ManageProjects));
    }
}
