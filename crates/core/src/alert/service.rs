//! Alert evaluation from budget variance results.

use crate::budget::{BudgetHealth, VarianceResult};

use super::types::{AlertDraft, AlertType};

/// Stateless service deciding which alert (if any) a variance state
/// warrants.
pub struct AlertService;

impl AlertService {
    /// Evaluate a variance result, producing at most one alert draft.
    ///
    /// Selection order: `over_budget` when spending exceeds the budget,
    /// else `threshold_critical`, else `threshold_warning`. A healthy,
    /// within-budget state produces nothing. De-duplication against
    /// unresolved alerts of the same type happens at the persistence
    /// layer.
    #[must_use]
    pub fn evaluate(variance: &VarianceResult) -> Option<AlertDraft> {
        let alert_type = if variance.is_over_budget {
            AlertType::OverBudget
        } else {
            match variance.status {
                BudgetHealth::Critical => AlertType::ThresholdCritical,
                BudgetHealth::Warning => AlertType::ThresholdWarning,
                BudgetHealth::Healthy => return None,
            }
        };

        let message = match alert_type {
            AlertType::OverBudget => format!(
                "Spending of {} exceeds the budget of {}",
                variance.total_spent, variance.total_budget
            ),
            AlertType::ThresholdCritical => format!(
                "Spending has reached {}% of budget (critical threshold)",
                variance.spent_percentage
            ),
            AlertType::ThresholdWarning => format!(
                "Spending has reached {}% of budget (warning threshold)",
                variance.spent_percentage
            ),
        };

        Some(AlertDraft {
            alert_type,
            severity: alert_type.severity(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::types::AlertSeverity;
    use crate::budget::BudgetService;
    use rust_decimal_macros::dec;

    #[test]
    fn test_healthy_state_produces_no_alert() {
        let variance = BudgetService::calculate_variance(dec!(1000), dec!(500));
        assert!(AlertService::evaluate(&variance).is_none());
    }

    #[test]
    fn test_warning_state_produces_warning_alert() {
        let variance = BudgetService::calculate_variance(dec!(1000), dec!(850));
        let alert = AlertService::evaluate(&variance).unwrap();

        assert_eq!(alert.alert_type, AlertType::ThresholdWarning);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert!(alert.message.contains("85.00"));
    }

    #[test]
    fn test_critical_state_produces_critical_alert() {
        let variance = BudgetService::calculate_variance(dec!(1000), dec!(960));
        let alert = AlertService::evaluate(&variance).unwrap();

        assert_eq!(alert.alert_type, AlertType::ThresholdCritical);
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_over_budget_wins_over_critical() {
        let variance = BudgetService::calculate_variance(dec!(1000), dec!(1200));
        let alert = AlertService::evaluate(&variance).unwrap();

        assert_eq!(alert.alert_type, AlertType::OverBudget);
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_zero_budget_positive_spend_is_over_budget_alert() {
        // Percentage is zero here, so threshold bands would miss it.
        let variance = BudgetService::calculate_variance(dec!(0), dec!(100));
        let alert = AlertService::evaluate(&variance).unwrap();

        assert_eq!(alert.alert_type, AlertType::OverBudget);
    }

    #[test]
    fn test_spent_equal_budget_is_critical_not_over() {
        let variance = BudgetService::calculate_variance(dec!(1000), dec!(1000));
        let alert = AlertService::evaluate(&variance).unwrap();

        assert_eq!(alert.alert_type, AlertType::ThresholdCritical);
    }
}
