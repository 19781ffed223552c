//! Budget amendment and change order routes.
//!
//! These are the only operations that move a project's budget. Both are
//! immutable records; corrections are made with a counter-entry.

use axum::{
    Json, Router,
    extract::{Path, State},
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
use rebar_db::{OrganizationRepository, ProjectRepository, repositories::project::ProjectError};

/// Creates the budget change routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/projects/{project_id}/amendments",
            post(create_amendment),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/amendments",
            get(list_amendments),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/change-orders",
            post(create_change_order),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/change-orders",
            get(list_change_orders),
        )
}

/// Request body for a budget amendment.
#[derive(Debug, Deserialize)]
pub struct CreateAmendmentRequest {
    /// Signed budget delta. Negative amounts reduce the budget.
    pub amount: Decimal,
    /// Why the budget is changing.
    pub reason: String,
}

/// Request body for a change order.
#[derive(Debug, Deserialize)]
pub struct CreateChangeOrderRequest {
    /// What the client requested.
    pub description: String,
    /// Signed budget delta.
    pub budget_delta: Decimal,
    /// Signed revenue delta.
    pub revenue_delta: Decimal,
}

/// POST `/organizations/{org_id}/projects/{project_id}/amendments` -
/// Apply a budget amendment.
async fn create_amendment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateAmendmentRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::AmendBudget).await
    {
        return response;
    }

    if payload.reason.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "reason_required",
                "message": "A reason is required for budget amendments"
            })),
        )
            .into_response();
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo
        .apply_amendment(
            org_id,
            project_id,
            payload.amount,
            payload.reason,
            auth.user_id(),
        )
        .await
    {
        Ok(outcome) => {
            info!(
                org_id = %org_id,
                project_id = %project_id,
                amount = %outcome.record.amount,
                new_budget = %outcome.project.budget,
                "Budget amended"
            );

            (
                StatusCode::CREATED,
                Json(json!({
                    "amendment": {
                        "id": outcome.record.id,
                        "project_id": outcome.record.project_id,
                        "amount": outcome.record.amount,
                        "reason": outcome.record.reason,
                        "created_by": outcome.record.created_by,
                        "created_at": outcome.record.created_at
                    },
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
            error!(error = %e, "Failed to apply amendment");
            map_project_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}/amendments` - List amendments.
async fn list_amendments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.list_amendments(org_id, project_id).await {
        Ok(amendments) => {
            let response: Vec<serde_json::Value> = amendments
                .into_iter()
                .map(|a| {
                    json!({
                        "id": a.id,
                        "project_id": a.project_id,
                        "amount": a.amount,
                        "reason": a.reason,
                        "created_by": a.created_by,
                        "created_at": a.created_at
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "amendments": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list amendments");
            map_project_error(&e)
        }
    }
}

/// POST `/organizations/{org_id}/projects/{project_id}/change-orders` -
/// Apply a change order.
async fn create_change_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateChangeOrderRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::AmendBudget).await
    {
        return response;
    }

    if payload.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "description_required",
                "message": "A description is required for change orders"
            })),
        )
            .into_response();
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo
        .apply_change_order(
            org_id,
            project_id,
            payload.description,
            payload.budget_delta,
            payload.revenue_delta,
            auth.user_id(),
        )
        .await
    {
        Ok(outcome) => {
            info!(
                org_id = %org_id,
                project_id = %project_id,
                budget_delta = %outcome.record.budget_delta,
                revenue_delta = %outcome.record.revenue_delta,
                "Change order applied"
            );

            (
                StatusCode::CREATED,
                Json(json!({
                    "change_order": {
                        "id": outcome.record.id,
                        "project_id": outcome.record.project_id,
                        "description": outcome.record.description,
                        "budget_delta": outcome.record.budget_delta,
                        "revenue_delta": outcome.record.revenue_delta,
                        "created_by": outcome.record.created_by,
                        "created_at": outcome.record.created_at
                    },
                    "project": {
                        "id": outcome.project.id,
                        "budget": outcome.project.budget,
                        "revenue": outcome.project.revenue,
                        "consumed_amount": outcome.project.consumed_amount
                    },
                    "variance": outcome.variance
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to apply change order");
            map_project_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}/change-orders` - List change orders.
async fn list_change_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.list_change_orders(org_id, project_id).await {
        Ok(change_orders) => {
            let response: Vec<serde_json::Value> = change_orders
                .into_iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "project_id": c.project_id,
                        "description": c.description,
                        "budget_delta": c.budget_delta,
                        "revenue_delta": c.revenue_delta,
                        "created_by": c.created_by,
                        "created_at": c.created_at
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "change_orders": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list change orders");
            map_project_error(&e)
        }
    }
}

/// Maps project errors to HTTP responses.
fn map_project_error(e: &ProjectError) -> axum::response::Response {
    match e {
        ProjectError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Project not found: {id}")
            })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
