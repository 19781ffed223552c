//! Repository layer for database access.

pub mod alert;
pub mod audit;
pub mod cost_allocation;
pub mod line_item;
pub mod material;
pub mod organization;
pub mod project;
pub mod session;
pub mod user;

pub use alert::{AlertError, AlertRepository};
pub use audit::{AuditEntry, AuditRepository};
pub use cost_allocation::{
    AllocationError, AllocationWithMaterials, CostAllocationRepository, CreateAllocationInput,
    CreatedAllocation, DecisionOutcome, MaterialAllocationInput,
};
pub use line_item::{LineItemError, LineItemRepository};
pub use material::{MaterialError, MaterialRepository};
pub use organization::OrganizationRepository;
pub use project::{
    BudgetChangeOutcome, CreateProjectInput, ProjectError, ProjectRepository, ProjectWithVariance,
    UpdateProjectInput,
};
pub use session::SessionRepository;
pub use user::UserRepository;
