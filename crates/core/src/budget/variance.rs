//! Budget variance calculation.

use rust_decimal::Decimal;

use super::types::{BudgetHealth, VarianceResult};

/// Stateless service for budget variance and impact calculations.
pub struct BudgetService;

impl BudgetService {
    /// Calculate variance between total budget and total spent.
    ///
    /// Division by a zero budget is avoided by reporting a spent
    /// percentage of zero; over-budget detection does not depend on the
    /// percentage and still fires for any positive spend against a zero
    /// budget.
    #[must_use]
    pub fn calculate_variance(total_budget: Decimal, total_spent: Decimal) -> VarianceResult {
        let spent_percentage = if total_budget.is_zero() {
            Decimal::ZERO
        } else {
            (total_spent / total_budget * Decimal::ONE_HUNDRED).round_dp(2)
        };

        VarianceResult {
            total_budget,
            total_spent,
            spent_percentage,
            remaining_budget: total_budget - total_spent,
            variance: total_spent - total_budget,
            is_over_budget: total_spent > total_budget,
            status: BudgetHealth::from_spent_percentage(spent_percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_healthy_variance() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(500));

        assert_eq!(result.spent_percentage, dec!(50.00));
        assert_eq!(result.remaining_budget, dec!(500));
        assert_eq!(result.variance, dec!(-500));
        assert!(!result.is_over_budget);
        assert_eq!(result.status, BudgetHealth::Healthy);
    }

    #[test]
    fn test_warning_at_exactly_80_percent() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(800));

        assert_eq!(result.spent_percentage, dec!(80.00));
        assert_eq!(result.status, BudgetHealth::Warning);
    }

    #[test]
    fn test_critical_at_exactly_95_percent() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(950));

        assert_eq!(result.spent_percentage, dec!(95.00));
        assert_eq!(result.status, BudgetHealth::Critical);
    }

    #[test]
    fn test_spent_equal_to_budget_is_not_over() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(1000));

        assert_eq!(result.spent_percentage, dec!(100.00));
        assert!(!result.is_over_budget);
        assert_eq!(result.status, BudgetHealth::Critical);
    }

    #[test]
    fn test_over_budget() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(1200));

        assert_eq!(result.spent_percentage, dec!(120.00));
        assert_eq!(result.remaining_budget, dec!(-200));
        assert_eq!(result.variance, dec!(200));
        assert!(result.is_over_budget);
    }

    #[test]
    fn test_zero_budget_zero_spend() {
        let result = BudgetService::calculate_variance(dec!(0), dec!(0));

        assert_eq!(result.spent_percentage, dec!(0));
        assert!(!result.is_over_budget);
        assert_eq!(result.status, BudgetHealth::Healthy);
    }

    #[test]
    fn test_zero_budget_positive_spend_is_over_budget() {
        let result = BudgetService::calculate_variance(dec!(0), dec!(500));

        // Percentage stays zero (no division by zero) but the over-budget
        // flag must still fire.
        assert_eq!(result.spent_percentage, dec!(0));
        assert!(result.is_over_budget);
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        let result = BudgetService::calculate_variance(dec!(3), dec!(1));

        assert_eq!(result.spent_percentage, dec!(33.33));
    }
}
