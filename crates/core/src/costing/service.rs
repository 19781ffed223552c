//! Cost total calculations.
//!
//! All arithmetic is exact decimal arithmetic; results carry the
//! combined scale of their inputs.

use rust_decimal::Decimal;

use super::types::{CostInput, CostTotals, LabourLine, MaterialLine};

/// Stateless service for cost arithmetic.
pub struct CostingService;

impl CostingService {
    /// Sum of `unit_price * quantity` across material rows.
    ///
    /// An empty sequence totals zero.
    #[must_use]
    pub fn material_total(rows: &[MaterialLine]) -> Decimal {
        rows.iter()
            .map(|row| row.unit_price * row.quantity)
            .sum()
    }

    /// Labour cost: rate times quantity.
    #[must_use]
    pub fn labour_cost(labour: &LabourLine) -> Decimal {
        labour.unit_cost * labour.quantity
    }

    /// Total cost: labour cost plus a precomputed material total.
    #[must_use]
    pub fn total_cost(labour: &LabourLine, material_total: Decimal) -> Decimal {
        Self::labour_cost(labour) + material_total
    }

    /// Computes all totals for a cost input.
    #[must_use]
    pub fn compute_totals(input: &CostInput) -> CostTotals {
        let labour_cost = Self::labour_cost(&input.labour);
        let material_cost = Self::material_total(&input.materials);
        CostTotals {
            labour_cost,
            material_cost,
            total_cost: labour_cost + material_cost,
        }
    }

    /// Budget remaining after consumed spend (may be negative).
    #[must_use]
    pub fn remaining_budget(total_budget: Decimal, consumed_amount: Decimal) -> Decimal {
        total_budget - consumed_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_material_total_empty_is_zero() {
        assert_eq!(CostingService::material_total(&[]), dec!(0));
    }

    #[test]
    fn test_material_total_single_row() {
        let rows = [MaterialLine {
            unit_price: dec!(10),
            quantity: dec!(3),
        }];
        assert_eq!(CostingService::material_total(&rows), dec!(30));
    }

    #[test]
    fn test_material_total_multiple_rows() {
        let rows = [
            MaterialLine {
                unit_price: dec!(10.50),
                quantity: dec!(2),
            },
            MaterialLine {
                unit_price: dec!(4.25),
                quantity: dec!(4),
            },
        ];
        assert_eq!(CostingService::material_total(&rows), dec!(38.00));
    }

    #[test]
    fn test_total_cost_combines_labour_and_materials() {
        let labour = LabourLine {
            unit_cost: dec!(50),
            quantity: dec!(2),
        };
        assert_eq!(CostingService::total_cost(&labour, dec!(30)), dec!(130));
    }

    #[test]
    fn test_compute_totals() {
        let input = CostInput {
            labour: LabourLine {
                unit_cost: dec!(50),
                quantity: dec!(2),
            },
            materials: vec![MaterialLine {
                unit_price: dec!(10),
                quantity: dec!(3),
            }],
        };
        let totals = CostingService::compute_totals(&input);

        assert_eq!(totals.labour_cost, dec!(100));
        assert_eq!(totals.material_cost, dec!(30));
        assert_eq!(totals.total_cost, dec!(130));
    }

    #[test]
    fn test_remaining_budget_can_go_negative() {
        assert_eq!(
            CostingService::remaining_budget(dec!(1000), dec!(1200)),
            dec!(-200)
        );
    }
}
