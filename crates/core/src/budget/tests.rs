//! Property-based and parameterized tests for budget calculations.

use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::BudgetHealth;
use super::variance::BudgetService;

/// Strategy for non-negative money amounts with cent precision.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// remaining_budget + total_spent == total_budget, exactly.
    #[test]
    fn prop_remaining_plus_spent_equals_budget(
        budget in arb_amount(),
        spent in arb_amount()
    ) {
        let result = BudgetService::calculate_variance(budget, spent);
        prop_assert_eq!(result.remaining_budget + result.total_spent, budget);
    }

    /// variance is the exact negation of remaining budget.
    #[test]
    fn prop_variance_negates_remaining(
        budget in arb_amount(),
        spent in arb_amount()
    ) {
        let result = BudgetService::calculate_variance(budget, spent);
        prop_assert_eq!(result.variance, -result.remaining_budget);
    }

    /// Status bands follow the fixed thresholds exactly.
    #[test]
    fn prop_status_matches_percentage_bands(
        budget in arb_amount(),
        spent in arb_amount()
    ) {
        let result = BudgetService::calculate_variance(budget, spent);
        let expected = if result.spent_percentage >= dec!(95) {
            BudgetHealth::Critical
        } else if result.spent_percentage >= dec!(80) {
            BudgetHealth::Warning
        } else {
            BudgetHealth::Healthy
        };
        prop_assert_eq!(result.status, expected);
    }

    /// Over-budget is strictly greater-than, independent of percentage.
    #[test]
    fn prop_over_budget_is_strict_comparison(
        budget in arb_amount(),
        spent in arb_amount()
    ) {
        let result = BudgetService::calculate_variance(budget, spent);
        prop_assert_eq!(result.is_over_budget, spent > budget);
    }

    /// Impact projection agrees with variance over the combined spend.
    #[test]
    fn prop_impact_consistent_with_variance(
        budget in arb_amount(),
        spent in arb_amount(),
        proposed in arb_amount()
    ) {
        let impact = BudgetService::evaluate_impact(spent, proposed, budget);
        let variance = BudgetService::calculate_variance(budget, spent + proposed);

        prop_assert_eq!(impact.new_spent_percentage, variance.spent_percentage);
        prop_assert_eq!(impact.remaining_after, variance.remaining_budget);
        prop_assert_eq!(impact.is_over_budget, variance.is_over_budget);
        prop_assert_eq!(impact.requires_approval, impact.will_exceed_warning);
    }
}

#[rstest]
#[case(dec!(0), BudgetHealth::Healthy)]
#[case(dec!(79.99), BudgetHealth::Healthy)]
#[case(dec!(80), BudgetHealth::Warning)]
#[case(dec!(94.99), BudgetHealth::Warning)]
#[case(dec!(95), BudgetHealth::Critical)]
#[case(dec!(100), BudgetHealth::Critical)]
#[case(dec!(150), BudgetHealth::Critical)]
fn test_health_band_boundaries(#[case] percentage: Decimal, #[case] expected: BudgetHealth) {
    assert_eq!(BudgetHealth::from_spent_percentage(percentage), expected);
}
