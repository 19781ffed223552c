//! Append-only audit log repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::audit_log;

/// Audit action constants recorded on state changes.
pub mod actions {
    /// A cost allocation was created in draft.
    pub const COST_ALLOCATED: &str = "cost_allocated";
    /// A draft allocation was submitted for approval.
    pub const COST_SUBMITTED: &str = "cost_submitted";
    /// A pending allocation was approved.
    pub const COST_APPROVED: &str = "cost_approved";
    /// A pending allocation was rejected.
    pub const COST_REJECTED: &str = "cost_rejected";
    /// A budget amendment was applied to a project.
    pub const BUDGET_AMENDED: &str = "budget_amended";
    /// A change order was applied to a project.
    pub const CHANGE_ORDER_APPLIED: &str = "change_order_applied";
    /// A project was created.
    pub const PROJECT_CREATED: &str = "project_created";
    /// A budget alert was acknowledged.
    pub const ALERT_ACKNOWLEDGED: &str = "alert_acknowledged";
    /// A budget alert was resolved.
    pub const ALERT_RESOLVED: &str = "alert_resolved";
}

/// A single audit entry before persistence.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Acting user.
    pub user_id: Uuid,
    /// Action constant from [`actions`].
    pub action: &'static str,
    /// Kind of entity acted upon, e.g. `cost_allocation`.
    pub entity_type: &'static str,
    /// Id of the entity acted upon.
    pub entity_id: Uuid,
    /// Project context, when applicable.
    pub project_id: Option<Uuid>,
    /// Structured detail payload.
    pub detail: Value,
}

/// Audit log repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an audit entry on any connection.
    ///
    /// Generic over the connection so callers can append within an open
    /// transaction and have the entry roll back with the unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        entry: AuditEntry,
    ) -> Result<audit_log::Model, DbErr> {
        let row = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            user_id: Set(entry.user_id),
            action: Set(entry.action.to_string()),
            entity_type: Set(entry.entity_type.to_string()),
            entity_id: Set(entry.entity_id),
            project_id: Set(entry.project_id),
            detail: Set(entry.detail),
            created_at: Set(chrono::Utc::now().into()),
        };

        row.insert(conn).await
    }

    /// Lists audit entries for an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        project_id: Option<Uuid>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<audit_log::Model>, u64), DbErr> {
        let mut query = audit_log::Entity::find()
            .filter(audit_log::Column::OrganizationId.eq(organization_id));

        if let Some(project_id) = project_id {
            query = query.filter(audit_log::Column::ProjectId.eq(project_id));
        }

        let total = query.clone().count(&self.db).await?;

        let entries = query
            .order_by_desc(audit_log::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((entries, total))
    }
}
