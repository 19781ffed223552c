//! Cost allocation repository: creation and the approval workflow.
//!
//! All transitions are validated by the core workflow service first, then
//! enforced against the database with status-guarded updates so that a
//! concurrent second transition observes `rows_affected == 0` and fails
//! with an invalid-transition error instead of double-applying.

use rebar_core::budget::{BudgetImpact, BudgetService, VarianceResult};
use rebar_core::costing::{
    CostInput, CostValidationError, CostingService, LabourLine, MaterialLine, validate_cost_input,
};
use rebar_core::workflow::{AllocationStatus as CoreStatus, WorkflowError, WorkflowService};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    cost_allocations, line_items, material_allocations, materials, projects,
    sea_orm_active_enums::AllocationStatus,
};

use super::audit::{self, AuditEntry, AuditRepository};
use crate::rls::set_rls_context;
use super::project::recompute_project_alerts;

/// Error types for cost allocation operations.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Allocation not found in the caller's organization.
    #[error("Cost allocation not found: {0}")]
    NotFound(Uuid),

    /// Project not found in the caller's organization.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Line item not found under the target project.
    #[error("Line item not found: {0}")]
    LineItemNotFound(Uuid),

    /// Material not found in the caller's organization.
    #[error("Material not found: {0}")]
    MaterialNotFound(Uuid),

    /// Cost input failed validation.
    #[error("Invalid cost input")]
    Invalid(Vec<CostValidationError>),

    /// Workflow rule violation (invalid transition, missing comments).
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One material row on a new allocation. `unit_price` overrides the
/// catalog rate when present.
#[derive(Debug, Clone)]
pub struct MaterialAllocationInput {
    /// Catalog material being consumed.
    pub material_id: Uuid,
    /// Quantity consumed.
    pub quantity: Decimal,
    /// Optional price override.
    pub unit_price: Option<Decimal>,
}

/// Input for creating a cost allocation.
#[derive(Debug, Clone)]
pub struct CreateAllocationInput {
    /// Target project.
    pub project_id: Uuid,
    /// Line item the cost posts against.
    pub line_item_id: Uuid,
    /// Labour quantity.
    pub quantity: Decimal,
    /// Labour rate.
    pub unit_cost: Decimal,
    /// Date the cost was incurred.
    pub date_incurred: chrono::NaiveDate,
    /// Optional description.
    pub description: Option<String>,
    /// Material rows.
    pub materials: Vec<MaterialAllocationInput>,
}

/// A cost allocation with its material rows.
#[derive(Debug, Clone)]
pub struct AllocationWithMaterials {
    /// Allocation record.
    pub allocation: cost_allocations::Model,
    /// Material rows owned by the allocation.
    pub materials: Vec<material_allocations::Model>,
}

/// Result of creating a cost allocation.
#[derive(Debug, Clone)]
pub struct CreatedAllocation {
    /// The new allocation and its materials.
    pub allocation: AllocationWithMaterials,
    /// Budget remaining before this (still draft) cost is approved.
    pub remaining_budget: Decimal,
    /// Projected impact were this cost approved.
    pub impact: BudgetImpact,
}

/// Result of an approval decision.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The allocation after the transition.
    pub allocation: cost_allocations::Model,
    /// Project state after the transition (unchanged for reject).
    pub project: projects::Model,
    /// Recomputed variance; present only when the budget state moved
    /// (approval).
    pub variance: Option<VarianceResult>,
}

/// Cost allocation repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct CostAllocationRepository {
    db: DatabaseConnection,
}

impl CostAllocationRepository {
    /// Creates a new cost allocation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a cost allocation in `draft`.
    ///
    /// Totals are computed by the core costing service; the budget impact
    /// of the proposed cost is evaluated and returned as data, never as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the project, line item, or a material is
    /// missing, the cost input is invalid, or the transaction fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        entered_by: Uuid,
        input: CreateAllocationInput,
    ) -> Result<CreatedAllocation, AllocationError> {
        let project = projects::Entity::find_by_id(input.project_id)
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AllocationError::ProjectNotFound(input.project_id))?;

        let _line_item = line_items::Entity::find_by_id(input.line_item_id)
            .filter(line_items::Column::ProjectId.eq(input.project_id))
            .one(&self.db)
            .await?
            .ok_or(AllocationError::LineItemNotFound(input.line_item_id))?;

        // Resolve catalog rates for rows without a price override.
        let mut material_lines = Vec::with_capacity(input.materials.len());
        for row in &input.materials {
            let material = materials::Entity::find_by_id(row.material_id)
                .filter(materials::Column::OrganizationId.eq(organization_id))
                .one(&self.db)
                .await?
                .ok_or(AllocationError::MaterialNotFound(row.material_id))?;

            material_lines.push(MaterialLine {
                unit_price: row.unit_price.unwrap_or(material.unit_price),
                quantity: row.quantity,
            });
        }

        let cost_input = CostInput {
            labour: LabourLine {
                unit_cost: input.unit_cost,
                quantity: input.quantity,
            },
            materials: material_lines.clone(),
        };

        validate_cost_input(&cost_input).map_err(AllocationError::Invalid)?;

        let totals = CostingService::compute_totals(&cost_input);
        let impact = BudgetService::evaluate_impact(
            project.consumed_amount,
            totals.total_cost,
            project.budget,
        );
        let remaining_budget =
            CostingService::remaining_budget(project.budget, project.consumed_amount);

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now().into();
        let allocation_id = Uuid::new_v4();

        let allocation = cost_allocations::ActiveModel {
            id: Set(allocation_id),
            organization_id: Set(organization_id),
            project_id: Set(input.project_id),
            line_item_id: Set(input.line_item_id),
            labour_cost: Set(totals.labour_cost),
            material_cost: Set(totals.material_cost),
            quantity: Set(input.quantity),
            unit_cost: Set(input.unit_cost),
            total_cost: Set(totals.total_cost),
            status: Set(AllocationStatus::Draft),
            entered_by: Set(entered_by),
            date_incurred: Set(input.date_incurred),
            description: Set(input.description),
            submitted_by: Set(None),
            submitted_at: Set(None),
            decided_by: Set(None),
            decided_at: Set(None),
            decision_comments: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let allocation = allocation.insert(&txn).await?;

        let mut material_rows = Vec::with_capacity(input.materials.len());
        for (row, line) in input.materials.iter().zip(&material_lines) {
            let material_row = material_allocations::ActiveModel {
                id: Set(Uuid::new_v4()),
                cost_allocation_id: Set(allocation_id),
                material_id: Set(row.material_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total: Set(line.unit_price * line.quantity),
                created_at: Set(now),
            };
            material_rows.push(material_row.insert(&txn).await?);
        }

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: entered_by,
                action: audit::actions::COST_ALLOCATED,
                entity_type: "cost_allocation",
                entity_id: allocation_id,
                project_id: Some(input.project_id),
                detail: json!({
                    "total_cost": totals.total_cost,
                    "requires_approval": impact.requires_approval,
                }),
            },
        )
        .await?;

        txn.commit().await?;

        Ok(CreatedAllocation {
            allocation: AllocationWithMaterials {
                allocation,
                materials: material_rows,
            },
            remaining_budget,
            impact,
        })
    }

    /// Gets an allocation with its material rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is not found or the query fails.
    pub async fn get_with_materials(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
    ) -> Result<AllocationWithMaterials, AllocationError> {
        let allocation = self.get(organization_id, allocation_id).await?;

        let materials = material_allocations::Entity::find()
            .filter(material_allocations::Column::CostAllocationId.eq(allocation_id))
            .order_by_asc(material_allocations::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(AllocationWithMaterials {
            allocation,
            materials,
        })
    }

    /// Gets an allocation within the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is not found or the query fails.
    pub async fn get(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
    ) -> Result<cost_allocations::Model, AllocationError> {
        cost_allocations::Entity::find_by_id(allocation_id)
            .filter(cost_allocations::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AllocationError::NotFound(allocation_id))
    }

    /// Lists allocations for a project, newest first, optionally narrowed
    /// by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<cost_allocations::Model>, AllocationError> {
        let mut query = cost_allocations::Entity::find()
            .filter(cost_allocations::Column::OrganizationId.eq(organization_id))
            .filter(cost_allocations::Column::ProjectId.eq(project_id));

        if let Some(status) = status {
            query = query.filter(cost_allocations::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(cost_allocations::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Submits a draft allocation for approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is missing, not in `draft`, or
    /// the transaction fails.
    pub async fn submit(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
        submitted_by: Uuid,
    ) -> Result<cost_allocations::Model, AllocationError> {
        let allocation = self.get(organization_id, allocation_id).await?;

        let current = core_status(&allocation.status);
        let _action = WorkflowService::submit(current, submitted_by)?;

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now();
        let result = cost_allocations::Entity::update_many()
            .col_expr(
                cost_allocations::Column::Status,
                Expr::value(AllocationStatus::Pending),
            )
            .col_expr(
                cost_allocations::Column::SubmittedBy,
                Expr::value(submitted_by),
            )
            .col_expr(cost_allocations::Column::SubmittedAt, Expr::value(now))
            .col_expr(cost_allocations::Column::UpdatedAt, Expr::value(now))
            .filter(cost_allocations::Column::Id.eq(allocation_id))
            .filter(cost_allocations::Column::Status.eq(AllocationStatus::Draft))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(self
                .stale_transition(organization_id, allocation_id, CoreStatus::Pending)
                .await);
        }

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: submitted_by,
                action: audit::actions::COST_SUBMITTED,
                entity_type: "cost_allocation",
                entity_id: allocation_id,
                project_id: Some(allocation.project_id),
                detail: json!({ "total_cost": allocation.total_cost }),
            },
        )
        .await?;

        txn.commit().await?;

        self.get(organization_id, allocation_id).await
    }

    /// Approves a pending allocation.
    ///
    /// One transaction: status-guarded allocation update, atomic
    /// consumed-amount increment on the project, variance recomputation
    /// with de-duplicated alerting, and an audit entry. The guarded
    /// update makes a concurrent second approval fail rather than
    /// increment twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is missing, not in `pending`,
    /// or the transaction fails.
    pub async fn approve(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
        decided_by: Uuid,
        comments: Option<String>,
    ) -> Result<DecisionOutcome, AllocationError> {
        let allocation = self.get(organization_id, allocation_id).await?;

        let current = core_status(&allocation.status);
        let _action = WorkflowService::approve(current, decided_by, comments.clone())?;

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now();
        let result = cost_allocations::Entity::update_many()
            .col_expr(
                cost_allocations::Column::Status,
                Expr::value(AllocationStatus::Approved),
            )
            .col_expr(cost_allocations::Column::DecidedBy, Expr::value(decided_by))
            .col_expr(cost_allocations::Column::DecidedAt, Expr::value(now))
            .col_expr(
                cost_allocations::Column::DecisionComments,
                Expr::value(comments),
            )
            .col_expr(cost_allocations::Column::UpdatedAt, Expr::value(now))
            .filter(cost_allocations::Column::Id.eq(allocation_id))
            .filter(cost_allocations::Column::Status.eq(AllocationStatus::Pending))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(self
                .stale_transition(organization_id, allocation_id, CoreStatus::Approved)
                .await);
        }

        // The only place consumed_amount moves, and it moves by addition.
        projects::Entity::update_many()
            .col_expr(
                projects::Column::ConsumedAmount,
                Expr::col(projects::Column::ConsumedAmount).add(allocation.total_cost),
            )
            .filter(projects::Column::Id.eq(allocation.project_id))
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;

        let (project, variance) =
            recompute_project_alerts(&txn, organization_id, allocation.project_id).await?;

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: decided_by,
                action: audit::actions::COST_APPROVED,
                entity_type: "cost_allocation",
                entity_id: allocation_id,
                project_id: Some(allocation.project_id),
                detail: json!({
                    "total_cost": allocation.total_cost,
                    "spent_percentage": variance.spent_percentage,
                    "is_over_budget": variance.is_over_budget,
                }),
            },
        )
        .await?;

        txn.commit().await?;

        let allocation = self.get(organization_id, allocation_id).await?;

        Ok(DecisionOutcome {
            allocation,
            project,
            variance: Some(variance),
        })
    }

    /// Rejects a pending allocation. Terminal; no budget mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is missing, not in `pending`,
    /// comments are empty, or the transaction fails.
    pub async fn reject(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
        decided_by: Uuid,
        comments: String,
    ) -> Result<DecisionOutcome, AllocationError> {
        let allocation = self.get(organization_id, allocation_id).await?;

        let current = core_status(&allocation.status);
        let _action = WorkflowService::reject(current, decided_by, comments.clone())?;

        let txn = self.db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        let now = chrono::Utc::now();
        let result = cost_allocations::Entity::update_many()
            .col_expr(
                cost_allocations::Column::Status,
                Expr::value(AllocationStatus::Rejected),
            )
            .col_expr(cost_allocations::Column::DecidedBy, Expr::value(decided_by))
            .col_expr(cost_allocations::Column::DecidedAt, Expr::value(now))
            .col_expr(
                cost_allocations::Column::DecisionComments,
                Expr::value(comments.clone()),
            )
            .col_expr(cost_allocations::Column::UpdatedAt, Expr::value(now))
            .filter(cost_allocations::Column::Id.eq(allocation_id))
            .filter(cost_allocations::Column::Status.eq(AllocationStatus::Pending))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(self
                .stale_transition(organization_id, allocation_id, CoreStatus::Rejected)
                .await);
        }

        AuditRepository::record(
            &txn,
            organization_id,
            AuditEntry {
                user_id: decided_by,
                action: audit::actions::COST_REJECTED,
                entity_type: "cost_allocation",
                entity_id: allocation_id,
                project_id: Some(allocation.project_id),
                detail: json!({ "comments": comments }),
            },
        )
        .await?;

        txn.commit().await?;

        let project = projects::Entity::find_by_id(allocation.project_id)
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(AllocationError::ProjectNotFound(allocation.project_id))?;

        let allocation = self.get(organization_id, allocation_id).await?;

        Ok(DecisionOutcome {
            allocation,
            project,
            variance: None,
        })
    }

    /// Builds the error for a guarded update that matched no rows: the
    /// allocation moved under us (or vanished), so report the transition
    /// from its current status.
    async fn stale_transition(
        &self,
        organization_id: Uuid,
        allocation_id: Uuid,
        to: CoreStatus,
    ) -> AllocationError {
        match self.get(organization_id, allocation_id).await {
            Ok(current) => WorkflowError::InvalidTransition {
                from: core_status(&current.status),
                to,
            }
            .into(),
            Err(err) => err,
        }
    }
}

/// Maps a database allocation status to the core workflow status.
#[must_use]
pub const fn core_status(status: &AllocationStatus) -> CoreStatus {
    match status {
        AllocationStatus::Draft => CoreStatus::Draft,
        AllocationStatus::Pending => CoreStatus::Pending,
        AllocationStatus::Approved => CoreStatus::Approved,
        AllocationStatus::Rejected => CoreStatus::Rejected,
    }
}

/// Maps a core workflow status to the database allocation status.
#[must_use]
pub const fn db_status(status: CoreStatus) -> AllocationStatus {
    match status {
        CoreStatus::Draft => AllocationStatus::Draft,
        CoreStatus::Pending => AllocationStatus::Pending,
        CoreStatus::Approved => AllocationStatus::Approved,
        CoreStatus::Rejected => AllocationStatus::Rejected,
    }
}

#[cfg(all(test, feature = "mock"))]
#[path = "cost_allocation_tests.rs"]
mod tests;
