//! `SeaORM` Entity for the projects table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ProjectStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    /// Approved spending ceiling. Mutated only by budget amendments and
    /// change orders.
    pub budget: Decimal,
    /// Running total of approved allocation costs. Mutated only on approval.
    pub consumed_amount: Decimal,
    pub revenue: Decimal,
    pub status: ProjectStatus,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
    #[sea_orm(has_many = "super::cost_allocations::Entity")]
    CostAllocations,
    #[sea_orm(has_many = "super::budget_alerts::Entity")]
    BudgetAlerts,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::cost_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostAllocations.def()
    }
}

impl Related<super::budget_alerts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAlerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
