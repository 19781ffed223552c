//! Budget impact projection for proposed costs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{BudgetHealth, CRITICAL_THRESHOLD, WARNING_THRESHOLD};
use super::variance::BudgetService;

/// Projected effect of adding a proposed cost to a project budget.
///
/// Exceeding a threshold is a normal outcome carried in this value,
/// never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetImpact {
    /// Total project budget.
    pub total_budget: Decimal,
    /// Amount spent before the proposed cost.
    pub current_spent: Decimal,
    /// The proposed additional cost.
    pub proposed_cost: Decimal,
    /// Spent amount if the proposed cost were approved.
    pub new_total_spent: Decimal,
    /// Projected spent percentage, rounded to 2 decimal places.
    pub new_spent_percentage: Decimal,
    /// Budget remaining after the proposed cost.
    pub remaining_after: Decimal,
    /// Whether the projected spend strictly exceeds the budget.
    pub is_over_budget: bool,
    /// Projected health classification.
    pub status: BudgetHealth,
    /// Whether the projected percentage reaches the warning threshold.
    pub will_exceed_warning: bool,
    /// Whether the projected percentage reaches the critical threshold.
    pub will_exceed_critical: bool,
    /// Whether the proposed cost should be flagged as an approval candidate.
    pub requires_approval: bool,
    /// Human-readable summary of the projected state, when noteworthy.
    pub alert_message: Option<String>,
}

impl BudgetService {
    /// Project the budget state as if `proposed_cost` were added to
    /// `current_spent`.
    #[must_use]
    pub fn evaluate_impact(
        current_spent: Decimal,
        proposed_cost: Decimal,
        total_budget: Decimal,
    ) -> BudgetImpact {
        let new_total_spent = current_spent + proposed_cost;
        let projected = Self::calculate_variance(total_budget, new_total_spent);

        let will_exceed_warning = projected.spent_percentage >= WARNING_THRESHOLD;
        let will_exceed_critical = projected.spent_percentage >= CRITICAL_THRESHOLD;

        let alert_message = if projected.is_over_budget {
            Some(format!(
                "Projected spend {new_total_spent} exceeds the budget of {total_budget}"
            ))
        } else if will_exceed_critical {
            Some(format!(
                "Projected spend reaches {}% of budget (critical threshold {CRITICAL_THRESHOLD}%)",
                projected.spent_percentage
            ))
        } else if will_exceed_warning {
            Some(format!(
                "Projected spend reaches {}% of budget (warning threshold {WARNING_THRESHOLD}%)",
                projected.spent_percentage
            ))
        } else {
            None
        };

        BudgetImpact {
            total_budget,
            current_spent,
            proposed_cost,
            new_total_spent,
            new_spent_percentage: projected.spent_percentage,
            remaining_after: projected.remaining_budget,
            is_over_budget: projected.is_over_budget,
            status: projected.status,
            will_exceed_warning,
            will_exceed_critical,
            requires_approval: will_exceed_warning,
            alert_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_impact_below_warning() {
        let impact = BudgetService::evaluate_impact(dec!(100), dec!(200), dec!(1000));

        assert_eq!(impact.new_total_spent, dec!(300));
        assert_eq!(impact.new_spent_percentage, dec!(30.00));
        assert!(!impact.will_exceed_warning);
        assert!(!impact.will_exceed_critical);
        assert!(!impact.requires_approval);
        assert!(impact.alert_message.is_none());
    }

    #[test]
    fn test_impact_crossing_warning_requires_approval() {
        let impact = BudgetService::evaluate_impact(dec!(0), dec!(850), dec!(1000));

        assert_eq!(impact.new_spent_percentage, dec!(85.00));
        assert!(impact.will_exceed_warning);
        assert!(!impact.will_exceed_critical);
        assert!(impact.requires_approval);
        assert_eq!(impact.status, BudgetHealth::Warning);
        assert!(impact.alert_message.is_some());
    }

    #[test]
    fn test_impact_reaching_full_budget_is_critical_not_over() {
        let impact = BudgetService::evaluate_impact(dec!(900), dec!(100), dec!(1000));

        assert_eq!(impact.new_spent_percentage, dec!(100.00));
        assert!(!impact.is_over_budget);
        assert!(impact.will_exceed_critical);
        assert_eq!(impact.status, BudgetHealth::Critical);
    }

    #[test]
    fn test_impact_over_budget_is_data_not_error() {
        let impact = BudgetService::evaluate_impact(dec!(900), dec!(200), dec!(1000));

        assert!(impact.is_over_budget);
        assert_eq!(impact.remaining_after, dec!(-100));
        let message = impact.alert_message.unwrap();
        assert!(message.contains("exceeds"));
    }

    #[test]
    fn test_impact_zero_budget_positive_spend() {
        let impact = BudgetService::evaluate_impact(dec!(0), dec!(50), dec!(0));

        assert_eq!(impact.new_spent_percentage, dec!(0));
        assert!(impact.is_over_budget);
        assert!(!impact.will_exceed_warning);
        assert!(impact.alert_message.is_some());
    }
}
