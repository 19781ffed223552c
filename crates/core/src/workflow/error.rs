//! Workflow error types for the cost allocation lifecycle.

use thiserror::Error;

use crate::workflow::role::{Capability, Role};
use crate::workflow::types::AllocationStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: AllocationStatus,
        /// The attempted target status.
        to: AllocationStatus,
    },

    /// Rejection comments are required but not provided.
    #[error("Rejection comments are required")]
    CommentsRequired,

    /// The role does not grant the attempted capability.
    #[error("Role {role} is not permitted to {capability}")]
    NotPermitted {
        /// The acting user's role.
        role: Role,
        /// The capability the action requires.
        capability: Capability,
    },

    /// The role string is not a known role.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::CommentsRequired => 400,
            Self::NotPermitted { .. } | Self::UnknownRole(_) => 403,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::CommentsRequired => "COMMENTS_REQUIRED",
            Self::NotPermitted { .. } => "NOT_PERMITTED",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: AllocationStatus::Draft,
            to: AllocationStatus::Approved,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_comments_required_error() {
        let err = WorkflowError::CommentsRequired;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "COMMENTS_REQUIRED");
    }

    #[test]
    fn test_not_permitted_error() {
        let err = WorkflowError::NotPermitted {
            role: Role::User,
            capability: Capability::DecideCost,
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NOT_PERMITTED");
        assert!(err.to_string().contains("user"));
        assert!(err.to_string().contains("decide_cost"));
    }

    #[test]
    fn test_unknown_role_error() {
        let err = WorkflowError::UnknownRole("owner".to_string());
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "UNKNOWN_ROLE");
    }
}
