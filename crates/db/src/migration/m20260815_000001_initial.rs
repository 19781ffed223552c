//! Initial database migration.
//!
//! Creates all enums, tables, triggers, and RLS policies for the budgeting
//! schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;

        // ============================================================
        // PART 3: PROJECTS & CATALOGS
        // ============================================================
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(LINE_ITEMS_SQL).await?;
        db.execute_unprepared(MATERIALS_SQL).await?;

        // ============================================================
        // PART 4: COST ALLOCATIONS
        // ============================================================
        db.execute_unprepared(COST_ALLOCATIONS_SQL).await?;
        db.execute_unprepared(MATERIAL_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 5: BUDGET CHANGES & ALERTS
        // ============================================================
        db.execute_unprepared(BUDGET_AMENDMENTS_SQL).await?;
        db.execute_unprepared(CHANGE_ORDERS_SQL).await?;
        db.execute_unprepared(BUDGET_ALERTS_SQL).await?;

        // ============================================================
        // PART 6: AUDIT LOG
        // ============================================================
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 8: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Membership roles (closed set)
CREATE TYPE user_role AS ENUM (
    'admin',
    'team_leader',
    'user'
);

-- Project lifecycle
CREATE TYPE project_status AS ENUM (
    'active',
    'on_hold',
    'completed',
    'archived'
);

-- Cost allocation approval lifecycle
CREATE TYPE allocation_status AS ENUM (
    'draft',
    'pending',
    'approved',
    'rejected'
);

-- Budget alert classification
CREATE TYPE alert_type AS ENUM (
    'threshold_warning',
    'threshold_critical',
    'over_budget'
);

CREATE TYPE alert_severity AS ENUM ('warning', 'critical');

CREATE TYPE alert_status AS ENUM (
    'active',
    'acknowledged',
    'resolved'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email) WHERE is_active = true;
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_organizations_slug ON organizations(slug);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role user_role NOT NULL DEFAULT 'user',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, organization_id)
);

CREATE INDEX idx_org_users_org ON organization_users(organization_id);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    refresh_token_hash VARCHAR(64) NOT NULL,
    user_agent VARCHAR(512),
    ip_address VARCHAR(45),
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sessions_token_hash ON sessions(refresh_token_hash) WHERE revoked_at IS NULL;
CREATE INDEX idx_sessions_user ON sessions(user_id);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    code VARCHAR(50) NOT NULL,
    description TEXT,
    budget NUMERIC(19, 4) NOT NULL DEFAULT 0,
    consumed_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    revenue NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status project_status NOT NULL DEFAULT 'active',
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budget_non_negative CHECK (budget >= 0),
    CONSTRAINT chk_consumed_non_negative CHECK (consumed_amount >= 0),
    UNIQUE (organization_id, code)
);

CREATE INDEX idx_projects_org ON projects(organization_id);
CREATE INDEX idx_projects_status ON projects(organization_id, status);
";

const LINE_ITEMS_SQL: &str = r"
CREATE TABLE line_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (project_id, code)
);

CREATE INDEX idx_line_items_project ON line_items(project_id);
";

const MATERIALS_SQL: &str = r"
CREATE TABLE materials (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    unit VARCHAR(50) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    sku VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_material_price_non_negative CHECK (unit_price >= 0)
);

CREATE INDEX idx_materials_org ON materials(organization_id);
";

const COST_ALLOCATIONS_SQL: &str = r"
CREATE TABLE cost_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    line_item_id UUID NOT NULL REFERENCES line_items(id),
    labour_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    material_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    unit_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status allocation_status NOT NULL DEFAULT 'draft',
    entered_by UUID NOT NULL REFERENCES users(id),
    date_incurred DATE NOT NULL,
    description TEXT,
    submitted_by UUID REFERENCES users(id),
    submitted_at TIMESTAMPTZ,
    decided_by UUID REFERENCES users(id),
    decided_at TIMESTAMPTZ,
    decision_comments TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_labour_cost_non_negative CHECK (labour_cost >= 0),
    CONSTRAINT chk_material_cost_non_negative CHECK (material_cost >= 0),
    CONSTRAINT chk_total_cost_non_negative CHECK (total_cost >= 0)
);

CREATE INDEX idx_cost_allocations_project ON cost_allocations(project_id);
CREATE INDEX idx_cost_allocations_status ON cost_allocations(organization_id, status);
";

const MATERIAL_ALLOCATIONS_SQL: &str = r"
CREATE TABLE material_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cost_allocation_id UUID NOT NULL REFERENCES cost_allocations(id) ON DELETE CASCADE,
    material_id UUID NOT NULL REFERENCES materials(id),
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    total NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ma_quantity_positive CHECK (quantity > 0),
    CONSTRAINT chk_ma_price_non_negative CHECK (unit_price >= 0)
);

CREATE INDEX idx_material_allocations_parent ON material_allocations(cost_allocation_id);
";

const BUDGET_AMENDMENTS_SQL: &str = r"
CREATE TABLE budget_amendments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL,
    reason TEXT NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_budget_amendments_project ON budget_amendments(project_id);
";

const CHANGE_ORDERS_SQL: &str = r"
CREATE TABLE change_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    budget_delta NUMERIC(19, 4) NOT NULL,
    revenue_delta NUMERIC(19, 4) NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_change_orders_project ON change_orders(project_id);
";

const BUDGET_ALERTS_SQL: &str = r"
CREATE TABLE budget_alerts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    alert_type alert_type NOT NULL,
    severity alert_severity NOT NULL,
    message TEXT NOT NULL,
    status alert_status NOT NULL DEFAULT 'active',
    acknowledged_by UUID REFERENCES users(id),
    acknowledged_at TIMESTAMPTZ,
    resolved_by UUID REFERENCES users(id),
    resolved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_budget_alerts_project ON budget_alerts(project_id, alert_type)
    WHERE status IN ('active', 'acknowledged');
CREATE INDEX idx_budget_alerts_org ON budget_alerts(organization_id, status);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    action VARCHAR(100) NOT NULL,
    entity_type VARCHAR(100) NOT NULL,
    entity_id UUID NOT NULL,
    project_id UUID,
    detail JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_log_org ON audit_log(organization_id, created_at DESC);
CREATE INDEX idx_audit_log_project ON audit_log(project_id) WHERE project_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: set_updated_at
-- Maintains updated_at on every row update
-- ============================================================
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
BEFORE UPDATE ON users
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_organizations_updated_at
BEFORE UPDATE ON organizations
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_organization_users_updated_at
BEFORE UPDATE ON organization_users
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_sessions_updated_at
BEFORE UPDATE ON sessions
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_projects_updated_at
BEFORE UPDATE ON projects
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_line_items_updated_at
BEFORE UPDATE ON line_items
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_materials_updated_at
BEFORE UPDATE ON materials
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_cost_allocations_updated_at
BEFORE UPDATE ON cost_allocations
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_budget_alerts_updated_at
BEFORE UPDATE ON budget_alerts
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- ============================================================
-- FUNCTION: prevent_decided_modification
-- Approved/rejected allocations are terminal records
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_decided_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status IN ('approved', 'rejected') THEN
        RAISE EXCEPTION 'Cannot modify a decided cost allocation.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_decided_mod
BEFORE UPDATE ON cost_allocations
FOR EACH ROW
EXECUTE FUNCTION prevent_decided_modification();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Enable RLS on all tenant tables
-- ============================================================

ALTER TABLE organizations ENABLE ROW LEVEL SECURITY;
ALTER TABLE organization_users ENABLE ROW LEVEL SECURITY;
ALTER TABLE projects ENABLE ROW LEVEL SECURITY;
ALTER TABLE line_items ENABLE ROW LEVEL SECURITY;
ALTER TABLE materials ENABLE ROW LEVEL SECURITY;
ALTER TABLE cost_allocations ENABLE ROW LEVEL SECURITY;
ALTER TABLE material_allocations ENABLE ROW LEVEL SECURITY;
ALTER TABLE budget_amendments ENABLE ROW LEVEL SECURITY;
ALTER TABLE change_orders ENABLE ROW LEVEL SECURITY;
ALTER TABLE budget_alerts ENABLE ROW LEVEL SECURITY;
ALTER TABLE audit_log ENABLE ROW LEVEL SECURITY;

-- Create policies for tenant isolation
-- Application sets context before queries: SET app.current_organization_id = 'org-uuid';

CREATE POLICY tenant_isolation ON organizations
    USING (id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON organization_users
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON projects
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON line_items
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON materials
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON cost_allocations
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON budget_amendments
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON change_orders
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON budget_alerts
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON audit_log
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

-- Policies for tables that reference parent tables (need join-based isolation)
CREATE POLICY tenant_isolation ON material_allocations
    USING (cost_allocation_id IN (
        SELECT id FROM cost_allocations
        WHERE organization_id = current_setting('app.current_organization_id', true)::UUID
    ));
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_decided_mod ON cost_allocations;
DROP TRIGGER IF EXISTS trg_budget_alerts_updated_at ON budget_alerts;
DROP TRIGGER IF EXISTS trg_cost_allocations_updated_at ON cost_allocations;
DROP TRIGGER IF EXISTS trg_materials_updated_at ON materials;
DROP TRIGGER IF EXISTS trg_line_items_updated_at ON line_items;
DROP TRIGGER IF EXISTS trg_projects_updated_at ON projects;
DROP TRIGGER IF EXISTS trg_sessions_updated_at ON sessions;
DROP TRIGGER IF EXISTS trg_organization_users_updated_at ON organization_users;
DROP TRIGGER IF EXISTS trg_organizations_updated_at ON organizations;
DROP TRIGGER IF EXISTS trg_users_updated_at ON users;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_decided_modification();
DROP FUNCTION IF EXISTS set_updated_at();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS audit_log CASCADE;
DROP TABLE IF EXISTS budget_alerts CASCADE;
DROP TABLE IF EXISTS change_orders CASCADE;
DROP TABLE IF EXISTS budget_amendments CASCADE;
DROP TABLE IF EXISTS material_allocations CASCADE;
DROP TABLE IF EXISTS cost_allocations CASCADE;
DROP TABLE IF EXISTS materials CASCADE;
DROP TABLE IF EXISTS line_items CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS sessions CASCADE;
DROP TABLE IF EXISTS organization_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS alert_status CASCADE;
DROP TYPE IF EXISTS alert_severity CASCADE;
DROP TYPE IF EXISTS alert_type CASCADE;
DROP TYPE IF EXISTS allocation_status CASCADE;
DROP TYPE IF EXISTS project_status CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
