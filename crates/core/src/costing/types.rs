//! Costing data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Labour component of a cost allocation: rate times quantity (hours).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LabourLine {
    /// Labour rate per unit.
    pub unit_cost: Decimal,
    /// Labour quantity (e.g. hours).
    pub quantity: Decimal,
}

/// One material row of a cost allocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Price per unit of material.
    pub unit_price: Decimal,
    /// Quantity of material.
    pub quantity: Decimal,
}

/// Cost allocation input prior to persistence.
#[derive(Debug, Clone)]
pub struct CostInput {
    /// Labour component.
    pub labour: LabourLine,
    /// Material rows.
    pub materials: Vec<MaterialLine>,
}

/// Computed totals for a cost allocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostTotals {
    /// Labour cost (`unit_cost * quantity`).
    pub labour_cost: Decimal,
    /// Sum of material row totals.
    pub material_cost: Decimal,
    /// Labour cost plus material cost.
    pub total_cost: Decimal,
}
