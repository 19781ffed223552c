//! Workflow service for cost allocation state transitions.
//!
//! This module implements the core state machine logic for
//! transitioning allocations through the approval workflow.

use chrono::Utc;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::role::{Capability, Role};
use crate::workflow::types::{AllocationStatus, WorkflowAction};

/// Stateless service for managing allocation workflow transitions.
///
/// All methods are associated functions that validate and execute
/// state transitions, returning the appropriate `WorkflowAction`
/// with audit trail information.
pub struct WorkflowService;

impl WorkflowService {
    /// Submit a draft allocation for approval.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` if the allocation is
    /// not in `Draft` status.
    pub fn submit(
        current_status: AllocationStatus,
        submitted_by: Uuid,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            AllocationStatus::Draft => Ok(WorkflowAction::Submit {
                new_status: AllocationStatus::Pending,
                submitted_by,
                submitted_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: AllocationStatus::Pending,
            }),
        }
    }

    /// Approve a pending allocation.
    ///
    /// Approval is the only transition that consumes project budget;
    /// the caller is responsible for applying the consumed-amount
    /// increment exactly once.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` if the allocation is
    /// not in `Pending` status.
    pub fn approve(
        current_status: AllocationStatus,
        decided_by: Uuid,
        comments: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            AllocationStatus::Pending => Ok(WorkflowAction::Approve {
                new_status: AllocationStatus::Approved,
                decided_by,
                decided_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: AllocationStatus::Approved,
            }),
        }
    }

    /// Reject a pending allocation. Rejection is terminal.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` if the allocation is
    /// not in `Pending` status.
    /// Returns `WorkflowError::CommentsRequired` if comments are empty
    /// or whitespace-only.
    pub fn reject(
        current_status: AllocationStatus,
        decided_by: Uuid,
        comments: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if comments.trim().is_empty() {
            return Err(WorkflowError::CommentsRequired);
        }

        match current_status {
            AllocationStatus::Pending => Ok(WorkflowAction::Reject {
                new_status: AllocationStatus::Rejected,
                decided_by,
                decided_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: AllocationStatus::Rejected,
            }),
        }
    }

    /// Check that a role string grants a capability.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::UnknownRole` if the string is not a
    /// known role.
    /// Returns `WorkflowError::NotPermitted` if the role does not
    /// grant the capability.
    pub fn authorize(role: &str, capability: Capability) -> Result<Role, WorkflowError> {
        let role = Role::parse(role).ok_or_else(|| WorkflowError::UnknownRole(role.to_string()))?;

        if role.allows(capability) {
            Ok(role)
        } else {
            Err(WorkflowError::NotPermitted { role, capability })
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Pending (submit)
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    #[must_use]
    pub const fn is_valid_transition(from: AllocationStatus, to: AllocationStatus) -> bool {
        matches!(
            (from, to),
            (AllocationStatus::Draft, AllocationStatus::Pending)
                | (
                    AllocationStatus::Pending,
                    AllocationStatus::Approved | AllocationStatus::Rejected
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let user_id = Uuid::new_v4();
        let action = WorkflowService::submit(AllocationStatus::Draft, user_id).unwrap();
        assert_eq!(action.new_status(), AllocationStatus::Pending);
    }

    #[test]
    fn test_submit_from_non_draft_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::submit(AllocationStatus::Pending, user_id);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_pending() {
        let user_id = Uuid::new_v4();
        let action = WorkflowService::approve(AllocationStatus::Pending, user_id, None).unwrap();
        assert_eq!(action.new_status(), AllocationStatus::Approved);
    }

    #[test]
    fn test_approve_draft_fails() {
        // Never-submitted allocations cannot be approved directly.
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(AllocationStatus::Draft, user_id, None);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_approved_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(AllocationStatus::Approved, user_id, None);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reject_from_pending_is_terminal() {
        let user_id = Uuid::new_v4();
        let action = WorkflowService::reject(
            AllocationStatus::Pending,
            user_id,
            "Costs not supported by receipts".to_string(),
        )
        .unwrap();
        assert_eq!(action.new_status(), AllocationStatus::Rejected);
        assert!(action.new_status().is_terminal());
    }

    #[test]
    fn test_reject_empty_comments_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::reject(AllocationStatus::Pending, user_id, String::new());
        assert!(matches!(result, Err(WorkflowError::CommentsRequired)));
    }

    #[test]
    fn test_reject_whitespace_comments_fails() {
        let user_id = Uuid::new_v4();
        let result =
            WorkflowService::reject(AllocationStatus::Pending, user_id, "   ".to_string());
        assert!(matches!(result, Err(WorkflowError::CommentsRequired)));
    }

    #[test]
    fn test_authorize_decide_cost() {
        assert!(WorkflowService::authorize("admin", Capability::DecideCost).is_ok());
        assert!(WorkflowService::authorize("team_leader", Capability::DecideCost).is_ok());
        assert!(matches!(
            WorkflowService::authorize("user", Capability::DecideCost),
            Err(WorkflowError::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_authorize_unknown_role_fails() {
        assert!(matches!(
            WorkflowService::authorize("superuser", Capability::RecordCost),
            Err(WorkflowError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(WorkflowService::is_valid_transition(
            AllocationStatus::Draft,
            AllocationStatus::Pending
        ));
        assert!(WorkflowService::is_valid_transition(
            AllocationStatus::Pending,
            AllocationStatus::Approved
        ));
        assert!(WorkflowService::is_valid_transition(
            AllocationStatus::Pending,
            AllocationStatus::Rejected
        ));

        assert!(!WorkflowService::is_valid_transition(
            AllocationStatus::Draft,
            AllocationStatus::Approved
        ));
        assert!(!WorkflowService::is_valid_transition(
            AllocationStatus::Rejected,
            AllocationStatus::Pending
        ));
        assert!(!WorkflowService::is_valid_transition(
            AllocationStatus::Approved,
            AllocationStatus::Draft
        ));
    }
}
