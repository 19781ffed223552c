//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::role::{Capability, Role};
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{AllocationStatus, WorkflowAction};

/// Strategy for generating random AllocationStatus values.
fn arb_status() -> impl Strategy<Value = AllocationStatus> {
    prop_oneof![
        Just(AllocationStatus::Draft),
        Just(AllocationStatus::Pending),
        Just(AllocationStatus::Approved),
        Just(AllocationStatus::Rejected),
    ]
}

/// Strategy for generating random UUIDs.
fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for generating non-empty strings (for comments).
fn arb_non_empty_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,100}".prop_map(|s| s.trim().to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Draft + submit → Pending with correct audit fields.
    #[test]
    fn prop_submit_from_draft_succeeds(user_id in arb_uuid()) {
        let action = WorkflowService::submit(AllocationStatus::Draft, user_id);
        prop_assert!(action.is_ok());
        let action = action.unwrap();
        prop_assert_eq!(action.new_status(), AllocationStatus::Pending);

        if let WorkflowAction::Submit { submitted_by, .. } = action {
            prop_assert_eq!(submitted_by, user_id);
        } else {
            prop_assert!(false, "Expected Submit action");
        }
    }

    /// Pending + approve → Approved with correct audit fields.
    #[test]
    fn prop_approve_from_pending_succeeds(user_id in arb_uuid()) {
        let action = WorkflowService::approve(AllocationStatus::Pending, user_id, None);
        prop_assert!(action.is_ok());
        let action = action.unwrap();
        prop_assert_eq!(action.new_status(), AllocationStatus::Approved);

        if let WorkflowAction::Approve { decided_by, .. } = action {
            prop_assert_eq!(decided_by, user_id);
        } else {
            prop_assert!(false, "Expected Approve action");
        }
    }

    /// Pending + reject → Rejected, carrying the comments.
    #[test]
    fn prop_reject_from_pending_succeeds(
        user_id in arb_uuid(),
        comments in arb_non_empty_string()
    ) {
        prop_assume!(!comments.trim().is_empty());

        let action = WorkflowService::reject(AllocationStatus::Pending, user_id, comments.clone());
        prop_assert!(action.is_ok());
        let action = action.unwrap();
        prop_assert_eq!(action.new_status(), AllocationStatus::Rejected);

        if let WorkflowAction::Reject { decided_by, comments: kept, .. } = action {
            prop_assert_eq!(decided_by, user_id);
            prop_assert_eq!(kept, comments);
        } else {
            prop_assert!(false, "Expected Reject action");
        }
    }

    /// Submit from non-Draft status returns InvalidTransition.
    #[test]
    fn prop_submit_from_non_draft_fails(
        status in arb_status(),
        user_id in arb_uuid()
    ) {
        prop_assume!(status != AllocationStatus::Draft);

        match WorkflowService::submit(status, user_id) {
            Err(WorkflowError::InvalidTransition { from, to }) => {
                prop_assert_eq!(from, status);
                prop_assert_eq!(to, AllocationStatus::Pending);
            }
            _ => prop_assert!(false, "Expected InvalidTransition error"),
        }
    }

    /// Approve from non-Pending status returns InvalidTransition.
    #[test]
    fn prop_approve_from_non_pending_fails(
        status in arb_status(),
        user_id in arb_uuid()
    ) {
        prop_assume!(status != AllocationStatus::Pending);

        match WorkflowService::approve(status, user_id, None) {
            Err(WorkflowError::InvalidTransition { from, to }) => {
                prop_assert_eq!(from, status);
                prop_assert_eq!(to, AllocationStatus::Approved);
            }
            _ => prop_assert!(false, "Expected InvalidTransition error"),
        }
    }

    /// Reject from non-Pending status returns InvalidTransition.
    #[test]
    fn prop_reject_from_non_pending_fails(
        status in arb_status(),
        user_id in arb_uuid(),
        comments in arb_non_empty_string()
    ) {
        prop_assume!(status != AllocationStatus::Pending);
        prop_assume!(!comments.trim().is_empty());

        match WorkflowService::reject(status, user_id, comments) {
            Err(WorkflowError::InvalidTransition { from, to }) => {
                prop_assert_eq!(from, status);
                prop_assert_eq!(to, AllocationStatus::Rejected);
            }
            _ => prop_assert!(false, "Expected InvalidTransition error"),
        }
    }

    /// is_valid_transition matches the documented transition table.
    #[test]
    fn prop_is_valid_transition_consistency(
        from in arb_status(),
        to in arb_status()
    ) {
        let is_valid = WorkflowService::is_valid_transition(from, to);

        let expected_valid = matches!(
            (from, to),
            (AllocationStatus::Draft, AllocationStatus::Pending)
                | (AllocationStatus::Pending, AllocationStatus::Approved)
                | (AllocationStatus::Pending, AllocationStatus::Rejected)
        );

        prop_assert_eq!(is_valid, expected_valid,
            "is_valid_transition({:?}, {:?}) = {}, expected {}",
            from, to, is_valid, expected_valid);
    }
}

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_reject_tab_only_comments_fails() {
        let result = WorkflowService::reject(
            AllocationStatus::Pending,
            Uuid::new_v4(),
            "\t\t".to_string(),
        );
        assert!(matches!(result, Err(WorkflowError::CommentsRequired)));
    }

    #[test]
    fn test_reject_newline_only_comments_fails() {
        let result = WorkflowService::reject(
            AllocationStatus::Pending,
            Uuid::new_v4(),
            "\n\n".to_string(),
        );
        assert!(matches!(result, Err(WorkflowError::CommentsRequired)));
    }

    /// Test all 16 combinations of is_valid_transition (4x4 matrix).
    #[test]
    fn test_is_valid_transition_all_combinations() {
        let statuses = [
            AllocationStatus::Draft,
            AllocationStatus::Pending,
            AllocationStatus::Approved,
            AllocationStatus::Rejected,
        ];

        let valid_transitions = [
            (AllocationStatus::Draft, AllocationStatus::Pending),
            (AllocationStatus::Pending, AllocationStatus::Approved),
            (AllocationStatus::Pending, AllocationStatus::Rejected),
        ];

        for from in &statuses {
            for to in &statuses {
                let is_valid = WorkflowService::is_valid_transition(*from, *to);
                let expected = valid_transitions.contains(&(*from, *to));
                assert_eq!(
                    is_valid, expected,
                    "is_valid_transition({:?}, {:?}) = {}, expected {}",
                    from, to, is_valid, expected
                );
            }
        }
    }

    /// Terminal states cannot transition to anything.
    #[test]
    fn test_terminal_states_cannot_transition() {
        let statuses = [
            AllocationStatus::Draft,
            AllocationStatus::Pending,
            AllocationStatus::Approved,
            AllocationStatus::Rejected,
        ];

        for terminal in [AllocationStatus::Approved, AllocationStatus::Rejected] {
            for to in &statuses {
                assert!(
                    !WorkflowService::is_valid_transition(terminal, *to),
                    "{terminal:?} should not transition to {to:?}"
                );
            }
        }
    }

    /// Full role/capability authorization matrix.
    #[test]
    fn test_authorization_matrix() {
        let decide = [
            ("admin", true),
            ("team_leader", true),
            ("user", false),
        ];
        for (role, allowed) in decide {
            for capability in [
                Capability::DecideCost,
                Capability::AmendBudget,
                Capability::ManageAlerts,
                Capability::ManageProjects,
            ] {
                assert_eq!(
                    WorkflowService::authorize(role, capability).is_ok(),
                    allowed,
                    "authorize({role}, {capability})"
                );
            }
        }

        for role in ["admin", "team_leader", "user"] {
            assert_eq!(
                WorkflowService::authorize(role, Capability::RecordCost).ok(),
                Role::parse(role)
            );
            assert!(WorkflowService::authorize(role, Capability::SubmitCost).is_ok());
        }
    }
}
