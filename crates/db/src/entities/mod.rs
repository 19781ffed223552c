//! `SeaORM` entity definitions for all tables.

pub mod audit_log;
pub mod budget_alerts;
pub mod budget_amendments;
pub mod change_orders;
pub mod cost_allocations;
pub mod line_items;
pub mod material_allocations;
pub mod materials;
pub mod organization_users;
pub mod organizations;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod users;
