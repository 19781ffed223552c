//! Workflow domain types for the cost allocation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cost allocation status in the approval workflow.
///
/// Allocations progress through these states from creation to decision.
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// Approved and Rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    /// Allocation is being drafted and can be modified.
    Draft,
    /// Allocation has been submitted for approval.
    Pending,
    /// Allocation has been approved; its cost is consumed (immutable).
    Approved,
    /// Allocation has been rejected (immutable).
    Rejected,
}

impl AllocationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the allocation can still be modified.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the allocation has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
///
/// Each variant captures the action performed, the resulting status,
/// and the audit trail information (who, when, why).
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Submit a draft allocation for approval.
    Submit {
        /// The new status after submission.
        new_status: AllocationStatus,
        /// The user who submitted the allocation.
        submitted_by: Uuid,
        /// When the allocation was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Approve a pending allocation.
    Approve {
        /// The new status after approval.
        new_status: AllocationStatus,
        /// The user who decided the allocation.
        decided_by: Uuid,
        /// When the decision was made.
        decided_at: DateTime<Utc>,
        /// Optional notes from the approver.
        comments: Option<String>,
    },
    /// Reject a pending allocation. Terminal.
    Reject {
        /// The new status after rejection (Rejected).
        new_status: AllocationStatus,
        /// The user who decided the allocation.
        decided_by: Uuid,
        /// When the decision was made.
        decided_at: DateTime<Utc>,
        /// The reason for rejection (required).
        comments: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> AllocationStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(AllocationStatus::Draft.as_str(), "draft");
        assert_eq!(AllocationStatus::Pending.as_str(), "pending");
        assert_eq!(AllocationStatus::Approved.as_str(), "approved");
        assert_eq!(AllocationStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            AllocationStatus::parse("draft"),
            Some(AllocationStatus::Draft)
        );
        assert_eq!(
            AllocationStatus::parse("PENDING"),
            Some(AllocationStatus::Pending)
        );
        assert_eq!(
            AllocationStatus::parse("Approved"),
            Some(AllocationStatus::Approved)
        );
        assert_eq!(
            AllocationStatus::parse("rejected"),
            Some(AllocationStatus::Rejected)
        );
        assert_eq!(AllocationStatus::parse("voided"), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", AllocationStatus::Draft), "draft");
        assert_eq!(format!("{}", AllocationStatus::Rejected), "rejected");
    }

    #[test]
    fn test_status_editable() {
        assert!(AllocationStatus::Draft.is_editable());
        assert!(!AllocationStatus::Pending.is_editable());
        assert!(!AllocationStatus::Approved.is_editable());
        assert!(!AllocationStatus::Rejected.is_editable());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!AllocationStatus::Draft.is_terminal());
        assert!(!AllocationStatus::Pending.is_terminal());
        assert!(AllocationStatus::Approved.is_terminal());
        assert!(AllocationStatus::Rejected.is_terminal());
    }
}
