//! Line item routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
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
    LineItemRepository, OrganizationRepository, repositories::line_item::LineItemError,
};

/// Creates the line item routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/projects/{project_id}/line-items",
            post(create_line_item),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/line-items",
            get(list_line_items),
        )
}

/// Request body for creating a line item.
#[derive(Debug, Deserialize)]
pub struct CreateLineItemRequest {
    /// Unique (per project) line item code.
    pub code: String,
    /// Line item name.
    pub name: String,
    /// Line item description.
    pub description: Option<String>,
}

/// POST `/organizations/{org_id}/projects/{project_id}/line-items` - Create a line item.
async fn create_line_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateLineItemRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    let line_item_repo = LineItemRepository::new((*state.db).clone());

    match line_item_repo
        .create(
            org_id,
            project_id,
            payload.code,
            payload.name,
            payload.description,
        )
        .await
    {
        Ok(item) => {
            info!(org_id = %org_id, project_id = %project_id, line_item_id = %item.id, "Line item created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": item.id,
                    "project_id": item.project_id,
                    "code": item.code,
                    "name": item.name,
                    "description": item.description,
                    "created_at": item.created_at
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create line item");
            map_line_item_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}/line-items` - List line items.
async fn list_line_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let line_item_repo = LineItemRepository::new((*state.db).clone());

    match line_item_repo.list(org_id, project_id).await {
        Ok(items) => {
            let response: Vec<serde_json::Value> = items
                .into_iter()
                .map(|item| {
                    json!({
                        "id": item.id,
                        "project_id": item.project_id,
                        "code": item.code,
                        "name": item.name,
                        "description": item.description
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "line_items": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list line items");
            map_line_item_error(&e)
        }
    }
}

/// Maps line item errors to HTTP responses.
fn map_line_item_error(e: &LineItemError) -> axum::response::Response {
    match e {
        LineItemError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Line item not found: {id}")
            })),
        )
            .into_response(),
        LineItemError::ProjectNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "project_not_found",
                "message": format!("Project not found: {id}")
            })),
        )
            .into_response(),
        LineItemError::DuplicateCode(code) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_code",
                "message": format!("Line item code already exists: {code}")
            })),
        )
            .into_response(),
        LineItemError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
