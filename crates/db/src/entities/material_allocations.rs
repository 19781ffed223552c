//! `SeaORM` Entity for the material_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "material_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cost_allocation_id: Uuid,
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub total: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cost_allocations::Entity",
        from = "Column::CostAllocationId",
        to = "super::cost_allocations::Column::Id"
    )]
    CostAllocations,
    #[sea_orm(
        belongs_to = "super::materials::Entity",
        from = "Column::MaterialId",
        to = "super::materials::Column::Id"
    )]
    Materials,
}

impl Related<super::cost_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostAllocations.def()
    }
}

impl Related<super::materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
