//! Budget variance types and threshold constants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spent percentage at which a project enters the warning band (80%).
pub const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Spent percentage at which a project enters the critical band (95%).
pub const CRITICAL_THRESHOLD: Decimal = Decimal::from_parts(95, 0, 0, false, 0);

/// Health classification of a project budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    /// Spending is below the warning threshold.
    Healthy,
    /// Spending has reached the warning threshold (80%).
    Warning,
    /// Spending has reached the critical threshold (95%).
    Critical,
}

impl BudgetHealth {
    /// Classifies a spent percentage against the fixed thresholds.
    #[must_use]
    pub fn from_spent_percentage(spent_percentage: Decimal) -> Self {
        if spent_percentage >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if spent_percentage >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Healthy
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget variance calculation result. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceResult {
    /// Total project budget.
    pub total_budget: Decimal,
    /// Total amount spent (approved allocations).
    pub total_spent: Decimal,
    /// Spent as a percentage of budget, rounded to 2 decimal places.
    /// Zero when the budget is zero.
    pub spent_percentage: Decimal,
    /// Budget minus spent (may be negative).
    pub remaining_budget: Decimal,
    /// Spent minus budget.
    pub variance: Decimal,
    /// Whether spending strictly exceeds the budget.
    pub is_over_budget: bool,
    /// Health classification against the fixed thresholds.
    pub status: BudgetHealth,
}
