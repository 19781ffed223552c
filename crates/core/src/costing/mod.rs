//! Cost total calculation and input validation for cost allocations.

pub mod service;
pub mod types;
pub mod validation;

pub use service::CostingService;
pub use types::{CostInput, CostTotals, LabourLine, MaterialLine};
pub use validation::{CostValidationError, validate_cost_input};
