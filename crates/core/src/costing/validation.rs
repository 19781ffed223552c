//! Business rule validation for cost allocation inputs.

use rust_decimal::Decimal;
use thiserror::Error;

use super::service::CostingService;
use super::types::CostInput;

/// Validation errors for cost allocation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostValidationError {
    /// Neither labour cost nor material rows are present.
    #[error("Cost allocation must include labour cost or at least one material row")]
    Empty,

    /// A quantity field must be strictly positive.
    #[error("{field} must be positive")]
    NonPositiveQuantity {
        /// The offending field.
        field: &'static str,
    },

    /// A price field cannot be negative.
    #[error("{field} cannot be negative")]
    NegativeAmount {
        /// The offending field.
        field: &'static str,
    },
}

/// Validates a cost allocation input, collecting every violation.
///
/// An input is valid iff its labour cost is positive or it has at least
/// one material row, every material quantity is strictly positive, and
/// the labour quantity and every price are non-negative. A zero labour
/// quantity is valid for material-only entries.
///
/// # Errors
///
/// Returns all violations found, each naming the offending field.
pub fn validate_cost_input(input: &CostInput) -> Result<(), Vec<CostValidationError>> {
    let mut errors = Vec::new();

    if input.labour.unit_cost < Decimal::ZERO {
        errors.push(CostValidationError::NegativeAmount { field: "unit_cost" });
    }
    if input.labour.quantity < Decimal::ZERO {
        errors.push(CostValidationError::NegativeAmount { field: "quantity" });
    }

    for material in &input.materials {
        if material.unit_price < Decimal::ZERO {
            errors.push(CostValidationError::NegativeAmount {
                field: "material.unit_price",
            });
        }
        if material.quantity <= Decimal::ZERO {
            errors.push(CostValidationError::NonPositiveQuantity {
                field: "material.quantity",
            });
        }
    }

    let labour_cost = CostingService::labour_cost(&input.labour);
    if labour_cost <= Decimal::ZERO && input.materials.is_empty() {
        errors.push(CostValidationError::Empty);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::types::{LabourLine, MaterialLine};
    use rust_decimal_macros::dec;

    fn labour(unit_cost: Decimal, quantity: Decimal) -> LabourLine {
        LabourLine {
            unit_cost,
            quantity,
        }
    }

    #[test]
    fn test_labour_only_is_valid() {
        let input = CostInput {
            labour: labour(dec!(50), dec!(2)),
            materials: vec![],
        };
        assert!(validate_cost_input(&input).is_ok());
    }

    #[test]
    fn test_materials_only_is_valid() {
        let input = CostInput {
            labour: labour(dec!(0), dec!(0)),
            materials: vec![MaterialLine {
                unit_price: dec!(10),
                quantity: dec!(1),
            }],
        };
        assert!(validate_cost_input(&input).is_ok());
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let input = CostInput {
            labour: labour(dec!(0), dec!(0)),
            materials: vec![],
        };
        let errors = validate_cost_input(&input).unwrap_err();
        assert_eq!(errors, vec![CostValidationError::Empty]);
    }

    #[test]
    fn test_negative_unit_cost_is_invalid() {
        let input = CostInput {
            labour: labour(dec!(-50), dec!(2)),
            materials: vec![],
        };
        let errors = validate_cost_input(&input).unwrap_err();
        assert!(errors.contains(&CostValidationError::NegativeAmount { field: "unit_cost" }));
    }

    #[test]
    fn test_negative_labour_quantity_is_a_negative_amount() {
        let input = CostInput {
            labour: labour(dec!(50), dec!(-2)),
            materials: vec![],
        };
        let errors = validate_cost_input(&input).unwrap_err();
        assert!(errors.contains(&CostValidationError::NegativeAmount { field: "quantity" }));
        assert!(
            !errors
                .iter()
                .any(|e| matches!(e, CostValidationError::NonPositiveQuantity { .. }))
        );
    }

    #[test]
    fn test_zero_labour_quantity_with_materials_is_valid() {
        let input = CostInput {
            labour: labour(dec!(50), dec!(0)),
            materials: vec![MaterialLine {
                unit_price: dec!(10),
                quantity: dec!(2),
            }],
        };
        assert!(validate_cost_input(&input).is_ok());
    }

    #[test]
    fn test_zero_material_quantity_is_invalid() {
        let input = CostInput {
            labour: labour(dec!(50), dec!(2)),
            materials: vec![MaterialLine {
                unit_price: dec!(10),
                quantity: dec!(0),
            }],
        };
        let errors = validate_cost_input(&input).unwrap_err();
        assert!(errors.contains(&CostValidationError::NonPositiveQuantity {
            field: "material.quantity"
        }));
    }

    #[test]
    fn test_multiple_violations_all_reported() {
        let input = CostInput {
            labour: labour(dec!(-1), dec!(-1)),
            materials: vec![MaterialLine {
                unit_price: dec!(-10),
                quantity: dec!(0),
            }],
        };
        let errors = validate_cost_input(&input).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
