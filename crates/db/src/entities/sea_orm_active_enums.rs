//! `SeaORM` mappings for `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership role within an organization.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Project-level management and approvals.
    #[sea_orm(string_value = "team_leader")]
    TeamLeader,
    /// Records and submits costs only.
    #[sea_orm(string_value = "user")]
    User,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::TeamLeader => "team_leader",
            Self::User => "user",
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "project_status")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work in progress, costs may be recorded.
    #[sea_orm(string_value = "active")]
    Active,
    /// Temporarily paused.
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    /// Finished.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Hidden from active listings.
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Approval status of a cost allocation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "allocation_status")]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// Editable, not yet submitted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Awaiting an approval decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved; counted in the project's consumed amount.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected with comments.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Type of a budget alert.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alert_type")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Spending reached the warning threshold.
    #[sea_orm(string_value = "threshold_warning")]
    ThresholdWarning,
    /// Spending reached the critical threshold.
    #[sea_orm(string_value = "threshold_critical")]
    ThresholdCritical,
    /// Spending exceeds the budget.
    #[sea_orm(string_value = "over_budget")]
    OverBudget,
}

/// Severity of a budget alert.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alert_severity")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Attention recommended.
    #[sea_orm(string_value = "warning")]
    Warning,
    /// Immediate attention required.
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Lifecycle status of a budget alert.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alert_status")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Raised and not yet seen.
    #[sea_orm(string_value = "active")]
    Active,
    /// Seen but not yet addressed.
    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,
    /// Addressed.
    #[sea_orm(string_value = "resolved")]
    Resolved,
}
