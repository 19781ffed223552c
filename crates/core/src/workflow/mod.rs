//! Cost allocation approval workflow.
//!
//! This module implements the allocation lifecycle state machine and
//! the role/capability authorization rules that gate each transition.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (`AllocationStatus`, `WorkflowAction`)
//! - `role` - Closed role and capability enums
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod role;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use role::{Capability, Role};
pub use service::WorkflowService;
pub use types::{AllocationStatus, WorkflowAction};
