//! `SeaORM` Entity for the cost_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AllocationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cost_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub line_item_id: Uuid,
    /// Labour cost, `unit_cost * quantity`.
    pub labour_cost: Decimal,
    /// Sum of material allocation totals.
    pub material_cost: Decimal,
    /// Labour quantity (hours, days, crew units).
    pub quantity: Decimal,
    /// Labour rate per quantity unit.
    pub unit_cost: Decimal,
    /// `labour_cost + material_cost`.
    pub total_cost: Decimal,
    pub status: AllocationStatus,
    pub entered_by: Uuid,
    pub date_incurred: Date,
    pub description: Option<String>,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTimeWithTimeZone>,
    pub decision_comments: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::line_items::Entity",
        from = "Column::LineItemId",
        to = "super::line_items::Column::Id"
    )]
    LineItems,
    #[sea_orm(has_many = "super::material_allocations::Entity")]
    MaterialAllocations,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::material_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
