//! Migration to enable FORCE ROW LEVEL SECURITY on all tenant tables.
//!
//! This ensures RLS policies apply even to table owners and superusers,
//! providing an additional layer of security for multi-tenant isolation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(FORCE_RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(DISABLE_FORCE_RLS_SQL).await?;

        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
-- ============================================================
-- FORCE ROW LEVEL SECURITY
-- Ensures RLS policies apply to ALL users including superusers
-- ============================================================

ALTER TABLE organizations FORCE ROW LEVEL SECURITY;
ALTER TABLE organization_users FORCE ROW LEVEL SECURITY;
ALTER TABLE projects FORCE ROW LEVEL SECURITY;
ALTER TABLE line_items FORCE ROW LEVEL SECURITY;
ALTER TABLE materials FORCE ROW LEVEL SECURITY;
ALTER TABLE cost_allocations FORCE ROW LEVEL SECURITY;
ALTER TABLE material_allocations FORCE ROW LEVEL SECURITY;
ALTER TABLE budget_amendments FORCE ROW LEVEL SECURITY;
ALTER TABLE change_orders FORCE ROW LEVEL SECURITY;
ALTER TABLE budget_alerts FORCE ROW LEVEL SECURITY;
ALTER TABLE audit_log FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
-- ============================================================
-- DISABLE FORCE ROW LEVEL SECURITY (Rollback)
-- ============================================================

ALTER TABLE organizations NO FORCE ROW LEVEL SECURITY;
ALTER TABLE organization_users NO FORCE ROW LEVEL SECURITY;
ALTER TABLE projects NO FORCE ROW LEVEL SECURITY;
ALTER TABLE line_items NO FORCE ROW LEVEL SECURITY;
ALTER TABLE materials NO FORCE ROW LEVEL SECURITY;
ALTER TABLE cost_allocations NO FORCE ROW LEVEL SECURITY;
ALTER TABLE material_allocations NO FORCE ROW LEVEL SECURITY;
ALTER TABLE budget_amendments NO FORCE ROW LEVEL SECURITY;
ALTER TABLE change_orders NO FORCE ROW LEVEL SECURITY;
ALTER TABLE budget_alerts NO FORCE ROW LEVEL SECURITY;
ALTER TABLE audit_log NO FORCE ROW LEVEL SECURITY;
";
