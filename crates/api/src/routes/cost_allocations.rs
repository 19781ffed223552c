//! Cost allocation routes: recording costs and the approval workflow.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    routes::{organizations::check_membership, projects::require_capability},
};
use rebar_core::workflow::Capability;
use rebar_db::{
    CostAllocationRepository, OrganizationRepository,
    entities::{cost_allocations, material_allocations, sea_orm_active_enums::AllocationStatus},
    repositories::cost_allocation::{
        AllocationError, CreateAllocationInput, MaterialAllocationInput,
    },
};

/// Creates the cost allocation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/projects/{project_id}/cost-allocations",
            post(create_allocation),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/cost-allocations",
            get(list_allocations),
        )
        .route(
            "/organizations/{org_id}/cost-allocations/{allocation_id}",
            get(get_allocation),
        )
        .route(
            "/organizations/{org_id}/cost-allocations/{allocation_id}/submit",
            post(submit_allocation),
        )
        .route(
            "/organizations/{org_id}/cost-allocations/{allocation_id}/approve",
            post(approve_allocation),
        )
        .route(
            "/organizations/{org_id}/cost-allocations/{allocation_id}/reject",
            post(reject_allocation),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// One material row on a new cost allocation.
#[derive(Debug, Deserialize)]
pub struct MaterialRowRequest {
    /// Catalog material being consumed.
    pub material_id: Uuid,
    /// Quantity consumed.
    pub quantity: Decimal,
    /// Optional price override; the catalog rate applies when absent.
    pub unit_price: Option<Decimal>,
}

/// Request body for creating a cost allocation.
#[derive(Debug, Deserialize)]
pub struct CreateAllocationRequest {
    /// Line item the cost posts against.
    pub line_item_id: Uuid,
    /// Labour quantity (e.g. hours).
    pub quantity: Decimal,
    /// Labour rate.
    pub unit_cost: Decimal,
    /// Date the cost was incurred.
    pub date_incurred: chrono::NaiveDate,
    /// Optional description.
    pub description: Option<String>,
    /// Material rows.
    #[serde(default)]
    pub materials: Vec<MaterialRowRequest>,
}

/// Query parameters for listing allocations.
#[derive(Debug, Deserialize)]
pub struct ListAllocationsQuery {
    /// Filter by status: draft, pending, approved, rejected.
    pub status: Option<String>,
}

/// Request body for an approval decision.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Optional decision comments.
    pub comments: Option<String>,
}

/// Request body for a rejection. Comments are mandatory.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the allocation is rejected.
    pub comments: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses an allocation status string.
fn parse_status(s: &str) -> Option<AllocationStatus> {
    match s.to_lowercase().as_str() {
        "draft" => Some(AllocationStatus::Draft),
        "pending" => Some(AllocationStatus::Pending),
        "approved" => Some(AllocationStatus::Approved),
        "rejected" => Some(AllocationStatus::Rejected),
        _ => None,
    }
}

fn allocation_json(allocation: &cost_allocations::Model) -> serde_json::Value {
    json!({
        "id": allocation.id,
        "project_id": allocation.project_id,
        "line_item_id": allocation.line_item_id,
        "labour_cost": allocation.labour_cost,
        "material_cost": allocation.material_cost,
        "quantity": allocation.quantity,
        "unit_cost": allocation.unit_cost,
        "total_cost": allocation.total_cost,
        "status": allocation.status,
        "entered_by": allocation.entered_by,
        "date_incurred": allocation.date_incurred,
        "description": allocation.description,
        "workflow": {
            "submitted_by": allocation.submitted_by,
            "submitted_at": allocation.submitted_at,
            "decided_by": allocation.decided_by,
            "decided_at": allocation.decided_at,
            "decision_comments": allocation.decision_comments
        },
        "created_at": allocation.created_at,
        "updated_at": allocation.updated_at
    })
}

fn material_rows_json(rows: &[material_allocations::Model]) -> Vec<serde_json::Value> {
    rows.iter()
        .map(|m| {
            json!({
                "id": m.id,
                "material_id": m.material_id,
                "quantity": m.quantity,
                "unit_price": m.unit_price,
                "total": m.total
            })
        })
        .collect()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/organizations/{org_id}/projects/{project_id}/cost-allocations` -
/// Record a cost in draft.
///
/// The response carries the projected budget impact; a cost that would
/// exceed the budget is still created.
async fn create_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateAllocationRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::RecordCost).await
    {
        return response;
    }

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    let input = CreateAllocationInput {
        project_id,
        line_item_id: payload.line_item_id,
        quantity: payload.quantity,
        unit_cost: payload.unit_cost,
        date_incurred: payload.date_incurred,
        description: payload.description,
        materials: payload
            .materials
            .into_iter()
            .map(|m| MaterialAllocationInput {
                material_id: m.material_id,
                quantity: m.quantity,
                unit_price: m.unit_price,
            })
            .collect(),
    };

    match allocation_repo.create(org_id, auth.user_id(), input).await {
        Ok(created) => {
            info!(
                org_id = %org_id,
                project_id = %project_id,
                allocation_id = %created.allocation.allocation.id,
                total_cost = %created.allocation.allocation.total_cost,
                "Cost allocation created"
            );

            let budget_validation = created
                .impact
                .alert_message
                .clone()
                .unwrap_or_else(|| "Within budget".to_string());

            (
                StatusCode::CREATED,
                Json(json!({
                    "cost_allocation": allocation_json(&created.allocation.allocation),
                    "materials": material_rows_json(&created.allocation.materials),
                    "remaining_budget": created.remaining_budget,
                    "budget_validation": budget_validation,
                    "exceeds_budget": created.impact.is_over_budget,
                    "budget_impact": created.impact
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create cost allocation");
            map_allocation_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}/cost-allocations` -
/// List allocations, optionally filtered by status.
async fn list_allocations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ListAllocationsQuery>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: draft, pending, approved, rejected"
                    })),
                )
                    .into_response();
            }
        },
    };

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    match allocation_repo.list(org_id, project_id, status).await {
        Ok(allocations) => {
            let response: Vec<serde_json::Value> =
                allocations.iter().map(allocation_json).collect();
            (
                StatusCode::OK,
                Json(json!({ "cost_allocations": response })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list cost allocations");
            map_allocation_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/cost-allocations/{allocation_id}` -
/// Get an allocation with its material rows.
async fn get_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, allocation_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    match allocation_repo.get_with_materials(org_id, allocation_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "cost_allocation": allocation_json(&result.allocation),
                "materials": material_rows_json(&result.materials)
            })),
        )
            .into_response(),
        Err(e) => map_allocation_error(&e),
    }
}

/// POST `/organizations/{org_id}/cost-allocations/{allocation_id}/submit` -
/// Submit a draft allocation for approval.
async fn submit_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, allocation_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::SubmitCost).await
    {
        return response;
    }

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    match allocation_repo
        .submit(org_id, allocation_id, auth.user_id())
        .await
    {
        Ok(allocation) => {
            info!(org_id = %org_id, allocation_id = %allocation_id, "Cost allocation submitted");
            (
                StatusCode::OK,
                Json(json!({ "cost_allocation": allocation_json(&allocation) })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to submit cost allocation");
            map_allocation_error(&e)
        }
    }
}

/// POST `/organizations/{org_id}/cost-allocations/{allocation_id}/approve` -
/// Approve a pending allocation.
///
/// The approved total is added to the project's consumed amount and the
/// budget state is recomputed in the same transaction.
async fn approve_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, allocation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ApproveRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::DecideCost).await
    {
        return response;
    }

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    match allocation_repo
        .approve(org_id, allocation_id, auth.user_id(), payload.comments)
        .await
    {
        Ok(outcome) => {
            info!(
                org_id = %org_id,
                allocation_id = %allocation_id,
                project_id = %outcome.project.id,
                consumed = %outcome.project.consumed_amount,
                "Cost allocation approved"
            );

            (
                StatusCode::OK,
                Json(json!({
                    "cost_allocation": allocation_json(&outcome.allocation),
                    "project": {
                        "id": outcome.project.id,
                        "budget": outcome.project.budget,
                        "consumed_amount": outcome.project.consumed_amount
                    },
                    "variance": outcome.variance
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to approve cost allocation");
            map_allocation_error(&e)
        }
    }
}

/// POST `/organizations/{org_id}/cost-allocations/{allocation_id}/reject` -
/// Reject a pending allocation. Comments are required; the budget is
/// untouched.
async fn reject_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, allocation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::DecideCost).await
    {
        return response;
    }

    let allocation_repo = CostAllocationRepository::new((*state.db).clone());

    match allocation_repo
        .reject(org_id, allocation_id, auth.user_id(), payload.comments)
        .await
    {
        Ok(outcome) => {
            info!(org_id = %org_id, allocation_id = %allocation_id, "Cost allocation rejected");
            (
                StatusCode::OK,
                Json(json!({ "cost_allocation": allocation_json(&outcome.allocation) })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to reject cost allocation");
            map_allocation_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps allocation errors to HTTP responses.
fn map_allocation_error(e: &AllocationError) -> axum::response::Response {
    match e {
        AllocationError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Cost allocation not found: {id}")
            })),
        )
            .into_response(),
        AllocationError::ProjectNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "project_not_found",
                "message": format!("Project not found: {id}")
            })),
        )
            .into_response(),
        AllocationError::LineItemNotFound(id) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "line_item_not_found",
                "message": format!("Line item not found: {id}")
            })),
        )
            .into_response(),
        AllocationError::MaterialNotFound(id) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "material_not_found",
                "message": format!("Material not found: {id}")
            })),
        )
            .into_response(),
        AllocationError::Invalid(violations) => {
            let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_failed",
                    "message": "Cost allocation input is invalid",
                    "violations": messages
                })),
            )
                .into_response()
        }
        AllocationError::Workflow(w) => {
            let status = StatusCode::from_u16(w.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "error": w.error_code(),
                    "message": w.to_string()
                })),
            )
                .into_response()
        }
        AllocationError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("draft"), Some(AllocationStatus::Draft));
        assert_eq!(parse_status("PENDING"), Some(AllocationStatus::Pending));
        assert_eq!(parse_status("approved"), Some(AllocationStatus::Approved));
        assert_eq!(parse_status("rejected"), Some(AllocationStatus::Rejected));
        assert_eq!(parse_status("cancelled"), None);
    }
}
