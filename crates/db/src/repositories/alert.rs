//! Budget alert repository.
//!
//! Alerts are raised by variance recomputation (approval, amendments,
//! change orders) and de-duplicated here: a new alert of a given type is
//! inserted only when the project has no unresolved alert of that type.

use rebar_core::alert::{AlertDraft, AlertSeverity as CoreSeverity, AlertType as CoreType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    budget_alerts,
    sea_orm_active_enums::{AlertSeverity, AlertStatus, AlertType},
};

/// Error types for alert operations.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Alert not found in the caller's organization.
    #[error("Alert not found: {0}")]
    NotFound(Uuid),

    /// Alert is not in a status that permits the operation.
    #[error("Alert is {actual}, expected {expected}")]
    InvalidStatus {
        /// Current status string.
        actual: String,
        /// Required status string.
        expected: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Budget alert repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    /// Creates a new alert repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an alert for a project unless an unresolved alert of the
    /// same type already exists.
    ///
    /// Returns the inserted row, or `None` when suppressed by
    /// de-duplication. Generic over the connection so the insert can
    /// participate in the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_if_absent<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        project_id: Uuid,
        draft: &AlertDraft,
    ) -> Result<Option<budget_alerts::Model>, DbErr> {
        let alert_type = db_alert_type(draft.alert_type);

        let unresolved = budget_alerts::Entity::find()
            .filter(budget_alerts::Column::ProjectId.eq(project_id))
            .filter(budget_alerts::Column::AlertType.eq(alert_type.clone()))
            .filter(
                budget_alerts::Column::Status
                    .is_in([AlertStatus::Active, AlertStatus::Acknowledged]),
            )
            .count(conn)
            .await?;

        if unresolved > 0 {
            return Ok(None);
        }

        let now = chrono::Utc::now().into();
        let alert = budget_alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            project_id: Set(project_id),
            alert_type: Set(alert_type),
            severity: Set(db_severity(draft.severity)),
            message: Set(draft.message.clone()),
            status: Set(AlertStatus::Active),
            acknowledged_by: Set(None),
            acknowledged_at: Set(None),
            resolved_by: Set(None),
            resolved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        alert.insert(conn).await.map(Some)
    }

    /// Lists alerts for an organization, optionally narrowed to a project
    /// or status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        project_id: Option<Uuid>,
        status: Option<AlertStatus>,
    ) -> Result<Vec<budget_alerts::Model>, DbErr> {
        let mut query = budget_alerts::Entity::find()
            .filter(budget_alerts::Column::OrganizationId.eq(organization_id));

        if let Some(project_id) = project_id {
            query = query.filter(budget_alerts::Column::ProjectId.eq(project_id));
        }
        if let Some(status) = status {
            query = query.filter(budget_alerts::Column::Status.eq(status));
        }

        query
            .order_by_desc(budget_alerts::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Gets an alert within the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert is not found or the query fails.
    pub async fn get(
        &self,
        organization_id: Uuid,
        alert_id: Uuid,
    ) -> Result<budget_alerts::Model, AlertError> {
        budget_alerts::Entity::find_by_id(alert_id)
            .filter(budget_alerts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AlertError::NotFound(alert_id))
    }

    /// Acknowledges an active alert. Acknowledged alerts still suppress
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert is missing, not `active`, or the
    /// update fails.
    pub async fn acknowledge(
        &self,
        organization_id: Uuid,
        alert_id: Uuid,
        acknowledged_by: Uuid,
    ) -> Result<budget_alerts::Model, AlertError> {
        let alert = self.get(organization_id, alert_id).await?;

        if alert.status != AlertStatus::Active {
            return Err(AlertError::InvalidStatus {
                actual: status_str(&alert.status).to_string(),
                expected: "active".to_string(),
            });
        }

        let now = chrono::Utc::now().into();
        let mut active: budget_alerts::ActiveModel = alert.into();
        active.status = Set(AlertStatus::Acknowledged);
        active.acknowledged_by = Set(Some(acknowledged_by));
        active.acknowledged_at = Set(Some(now));
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Resolves an active or acknowledged alert. A recurrence of the same
    /// condition afterwards raises a fresh alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert is missing, already resolved, or the
    /// update fails.
    pub async fn resolve(
        &self,
        organization_id: Uuid,
        alert_id: Uuid,
        resolved_by: Uuid,
    ) -> Result<budget_alerts::Model, AlertError> {
        let alert = self.get(organization_id, alert_id).await?;

        if alert.status == AlertStatus::Resolved {
            return Err(AlertError::InvalidStatus {
                actual: "resolved".to_string(),
                expected: "active or acknowledged".to_string(),
            });
        }

        let now = chrono::Utc::now().into();
        let mut active: budget_alerts::ActiveModel = alert.into();
        active.status = Set(AlertStatus::Resolved);
        active.resolved_by = Set(Some(resolved_by));
        active.resolved_at = Set(Some(now));
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }
}

/// Maps a core alert type to its database enum.
#[must_use]
pub fn db_alert_type(alert_type: CoreType) -> AlertType {
    match alert_type {
        CoreType::ThresholdWarning => AlertType::ThresholdWarning,
        CoreType::ThresholdCritical => AlertType::ThresholdCritical,
        CoreType::OverBudget => AlertType::OverBudget,
    }
}

/// Maps a core alert severity to its database enum.
#[must_use]
pub fn db_severity(severity: CoreSeverity) -> AlertSeverity {
    match severity {
        CoreSeverity::Warning => AlertSeverity::Warning,
        CoreSeverity::Critical => AlertSeverity::Critical,
    }
}

const fn status_str(status: &AlertStatus) -> &'static str {
    match status {
        AlertStatus::Active => "active",
        AlertStatus::Acknowledged => "acknowledged",
        AlertStatus::Resolved => "resolved",
    }
}

#[cfg(all(test, feature = "mock"))]
#[path = "alert_tests.rs"]
mod tests;
