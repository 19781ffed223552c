//! Budget variance analysis and impact projection.

pub mod impact;
pub mod types;
pub mod variance;

#[cfg(test)]
mod tests;

pub use impact::BudgetImpact;
pub use types::{BudgetHealth, CRITICAL_THRESHOLD, VarianceResult, WARNING_THRESHOLD};
pub use variance::BudgetService;
