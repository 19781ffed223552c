//! Project repository for database operations.
//!
//! Owns project CRUD, variance reads, and the two budget-changing
//! operations: budget amendments and change orders. Both apply their
//! deltas atomically with variance recomputation, alert de-dup, and an
//! audit entry in one transaction.

use rebar_core::alert::AlertService;
use rebar_core::budget::{BudgetService, VarianceResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    budget_amendments, change_orders, projects, sea_orm_active_enums::ProjectStatus,
};

use super::audit::{self, AuditEntry, AuditRepository};
use crate::rls::set_rls_context;
use super::alert::AlertRepository;

/// Error types for project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Project not found in the caller's organization.
    #[error("Project not found: {0}")]
    NotFound(Uuid),

    /// Project code already exists in the organization.
    #[error("Project code already exists: {0}")]
    DuplicateCode(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Project name.
    pub name: String,
    /// Unique (per organization) project code.
    pub code: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial budget.
    pub budget: rust_decimal::Decimal,
    /// Contract revenue.
    pub revenue: rust_decimal::Decimal,
    /// User creating the project.
    pub created_by: Uuid,
}

/// Input for updating a project's descriptive fields.
///
/// Budget and consumed amount are deliberately absent: the budget moves
/// only through amendments and change orders, the consumed amount only
/// through approval.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<ProjectStatus>,
}

/// A project together with its current variance state.
#[derive(Debug, Clone)]
pub struct ProjectWithVariance {
    /// Project record.
    pub project: projects::Model,
    /// Derived variance result.
    pub variance: VarianceResult,
}

/// Outcome of applying a budget change (amendment or change order).
#[derive(Debug, Clone)]
pub struct BudgetChangeOutcome<T> {
    /// The inserted change record.
    pub record: T,
    /// Project state after the change.
    pub project: projects::Model,
    /// Variance after the change.
    pub variance: VarianceResult,
}

/// Project repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new project.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is already taken in the organization
    /// or the database insert fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: CreateProjectInput,
    ) -> Result<projects::Model, ProjectError> {
        let existing = projects::Entity::find()
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .filter(projects::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(ProjectError::DuplicateCode(input.code));
        }

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now().into();
        let project_id = Uuid::new_v4();

        let project = projects::ActiveModel {
            id: Set(project_id),
            organization_id: Set(organization_id),
            name: Set(input.name),
            code: Set(input.code),
            description: Set(input.description),
            budget: Set(input.budget),
            consumed_amount: Set(rust_decimal::Decimal::ZERO),
            revenue: Set(input.revenue),
            status: Set(ProjectStatus::Active),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let project = project.insert(&txn).await?;

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: project.created_by,
                action: audit::actions::PROJECT_CREATED,
                entity_type: "project",
                entity_id: project.id,
                project_id: Some(project.id),
                detail: json!({ "code": project.code, "budget": project.budget }),
            },
        )
        .await?;

        txn.commit().await?;

        Ok(project)
    }

    /// Gets a project within the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or the query fails.
    pub async fn get(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<projects::Model, ProjectError> {
        projects::Entity::find_by_id(project_id)
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(project_id))
    }

    /// Lists projects for an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<projects::Model>, ProjectError> {
        Ok(projects::Entity::find()
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Updates a project's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or the update fails.
    pub async fn update(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<projects::Model, ProjectError> {
        let project = self.get(organization_id, project_id).await?;

        let mut active: projects::ActiveModel = project.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Archives a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or the update fails.
    pub async fn archive(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<projects::Model, ProjectError> {
        self.update(
            organization_id,
            project_id,
            UpdateProjectInput {
                status: Some(ProjectStatus::Archived),
                ..Default::default()
            },
        )
        .await
    }

    /// Gets a project with its current budget variance.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or the query fails.
    pub async fn variance(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<ProjectWithVariance, ProjectError> {
        let project = self.get(organization_id, project_id).await?;
        let variance = BudgetService::calculate_variance(project.budget, project.consumed_amount);

        Ok(ProjectWithVariance { project, variance })
    }

    /// Applies a budget amendment: inserts the amendment row, adds the
    /// signed delta to the project budget atomically, recomputes variance,
    /// raises an alert if warranted, and records an audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or any step of the
    /// transaction fails.
    pub async fn apply_amendment(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        amount: rust_decimal::Decimal,
        reason: String,
        created_by: Uuid,
    ) -> Result<BudgetChangeOutcome<budget_amendments::Model>, ProjectError> {
        // Existence check outside the transaction keeps the 404 cheap.
        self.get(organization_id, project_id).await?;

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now().into();
        let amendment = budget_amendments::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            project_id: Set(project_id),
            amount: Set(amount),
            reason: Set(reason),
            created_by: Set(created_by),
            created_at: Set(now),
        };
        let amendment = amendment.insert(&txn).await?;

        projects::Entity::update_many()
            .col_expr(
                projects::Column::Budget,
                Expr::col(projects::Column::Budget).add(amount),
            )
            .filter(projects::Column::Id.eq(project_id))
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;

        let (project, variance) =
            recompute_project_alerts(&txn, organization_id, project_id).await?;

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: created_by,
                action: audit::actions::BUDGET_AMENDED,
                entity_type: "budget_amendment",
                entity_id: amendment.id,
                project_id: Some(project_id),
                detail: json!({
                    "amount": amendment.amount,
                    "new_budget": project.budget,
                }),
            },
        )
        .await?;

        txn.commit().await?;

        Ok(BudgetChangeOutcome {
            record: amendment,
            project,
            variance,
        })
    }

    /// Applies a change order: inserts the record, adds budget and revenue
    /// deltas atomically, recomputes variance, raises an alert if
    /// warranted, and records an audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or any step of the
    /// transaction fails.
    pub async fn apply_change_order(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        description: String,
        budget_delta: rust_decimal::Decimal,
        revenue_delta: rust_decimal::Decimal,
        created_by: Uuid,
    ) -> Result<BudgetChangeOutcome<change_orders::Model>, ProjectError> {
        self.get(organization_id, project_id).await?;

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now().into();
        let change_order = change_orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            project_id: Set(project_id),
            description: Set(description),
            budget_delta: Set(budget_delta),
            revenue_delta: Set(revenue_delta),
            created_by: Set(created_by),
            created_at: Set(now),
        };
        let change_order = change_order.insert(&txn).await?;

        projects::Entity::update_many()
            .col_expr(
                projects::Column::Budget,
                Expr::col(projects::Column::Budget).add(budget_delta),
            )
            .col_expr(
                projects::Column::Revenue,
                Expr::col(projects::Column::Revenue).add(revenue_delta),
            )
            .filter(projects::Column::Id.eq(project_id))
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;

        let (project, variance) =
            recompute_project_alerts(&txn, organization_id, project_id).await?;

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: created_by,
                action: audit::actions::CHANGE_ORDER_APPLIED,
                entity_type: "change_order",
                entity_id: change_order.id,
                project_id: Some(project_id),
                detail: json!({
                    "budget_delta": change_order.budget_delta,
                    "revenue_delta": change_order.revenue_delta,
                    "new_budget": project.budget,
                }),
            },
        )
        .await?;

        txn.commit().await?;

        Ok(BudgetChangeOutcome {
            record: change_order,
            project,
            variance,
        })
    }

    /// Lists amendments for a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_amendments(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<budget_amendments::Model>, ProjectError> {
        Ok(budget_amendments::Entity::find()
            .filter(budget_amendments::Column::OrganizationId.eq(organization_id))
            .filter(budget_amendments::Column::ProjectId.eq(project_id))
            .order_by_desc(budget_amendments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Lists change orders for a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_change_orders(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<change_orders::Model>, ProjectError> {
        Ok(change_orders::Entity::find()
            .filter(change_orders::Column::OrganizationId.eq(organization_id))
            .filter(change_orders::Column::ProjectId.eq(project_id))
            .order_by_desc(change_orders::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

/// Re-reads a project, recomputes its variance, and inserts at most one
/// de-duplicated alert when the state warrants it.
///
/// Runs on the caller's connection so the alert participates in the same
/// transaction as the budget or consumed-amount change that triggered it.
pub(crate) async fn recompute_project_alerts<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    project_id: Uuid,
) -> Result<(projects::Model, VarianceResult), DbErr> {
    let project = projects::Entity::find_by_id(project_id)
        .filter(projects::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("project {project_id}")))?;

    let variance = BudgetService::calculate_variance(project.budget, project.consumed_amount);

    if let Some(draft) = AlertService::evaluate(&variance) {
        AlertRepository::create_if_absent(conn, organization_id, project_id, &draft).await?;
    }

    Ok((project, variance))
}
