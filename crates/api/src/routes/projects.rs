//! Project routes: CRUD, variance reads, and budget impact projection.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::organizations::check_membership};
use rebar_core::budget::{BudgetService, CRITICAL_THRESHOLD, WARNING_THRESHOLD};
use rebar_core::workflow::{Capability, WorkflowError, WorkflowService};
use rebar_db::{
    OrganizationRepository, ProjectRepository,
    entities::sea_orm_active_enums::ProjectStatus,
    repositories::project::{CreateProjectInput, ProjectError, UpdateProjectInput},
};

/// Creates the project routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/projects", post(create_project))
        .route("/organizations/{org_id}/projects", get(list_projects))
        .route(
            "/organizations/{org_id}/projects/{project_id}",
            get(get_project),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}",
            put(update_project),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}",
            delete(archive_project),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/variance",
            get(get_variance),
        )
        .route(
            "/organizations/{org_id}/projects/{project_id}/budget-impact",
            post(budget_impact),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Unique (per organization) project code.
    pub code: String,
    /// Project description.
    pub description: Option<String>,
    /// Initial budget.
    pub budget: Decimal,
    /// Contract revenue.
    pub revenue: Decimal,
}

/// Request body for updating a project.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// Project name.
    pub name: Option<String>,
    /// Project description.
    pub description: Option<String>,
    /// Project status: active, on_hold, completed, archived.
    pub status: Option<String>,
}

/// Request body for projecting budget impact.
#[derive(Debug, Deserialize)]
pub struct BudgetImpactRequest {
    /// The cost being considered.
    pub proposed_cost: Decimal,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the caller's membership and checks the capability against
/// their role. Non-members get 403 before any resource lookup.
pub(crate) async fn require_capability(
    org_repo: &OrganizationRepository,
    org_id: Uuid,
    user_id: Uuid,
    capability: Capability,
) -> Result<(), axum::response::Response> {
    let membership = match org_repo.get_user_membership(org_id, user_id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "You are not a member of this organization"
                })),
            )
                .into_response());
        }
        Err(e) => {
            error!(error = %e, "Failed to check membership");
            return Err(internal_error());
        }
    };

    match WorkflowService::authorize(membership.role.as_str(), capability) {
        Ok(_) => Ok(()),
        Err(WorkflowError::NotPermitted { role, capability }) => Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": format!("Role {role} cannot {capability}")
            })),
        )
            .into_response()),
        Err(e) => {
            error!(error = %e, "Authorization failed");
            Err(internal_error())
        }
    }
}

/// Parses a project status string.
fn parse_status(s: &str) -> Option<ProjectStatus> {
    match s.to_lowercase().as_str() {
        "active" => Some(ProjectStatus::Active),
        "on_hold" => Some(ProjectStatus::OnHold),
        "completed" => Some(ProjectStatus::Completed),
        "archived" => Some(ProjectStatus::Archived),
        _ => None,
    }
}

fn project_json(project: &rebar_db::entities::projects::Model) -> serde_json::Value {
    json!({
        "id": project.id,
        "name": project.name,
        "code": project.code,
        "description": project.description,
        "budget": project.budget,
        "consumed_amount": project.consumed_amount,
        "revenue": project.revenue,
        "status": project.status,
        "created_at": project.created_at,
        "updated_at": project.updated_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/organizations/{org_id}/projects` - Create a project.
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    if payload.budget < Decimal::ZERO || payload.revenue < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_amount",
                "message": "Budget and revenue must be non-negative"
            })),
        )
            .into_response();
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    let input = CreateProjectInput {
        name: payload.name,
        code: payload.code,
        description: payload.description,
        budget: payload.budget,
        revenue: payload.revenue,
        created_by: auth.user_id(),
    };

    match project_repo.create(org_id, input).await {
        Ok(project) => {
            info!(org_id = %org_id, project_id = %project.id, code = %project.code, "Project created");
            (StatusCode::CREATED, Json(project_json(&project))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create project");
            map_project_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects` - List projects.
async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.list(org_id).await {
        Ok(projects) => {
            let response: Vec<serde_json::Value> = projects.iter().map(project_json).collect();
            (StatusCode::OK, Json(json!({ "projects": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list projects");
            map_project_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}` - Get a project.
async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.get(org_id, project_id).await {
        Ok(project) => (StatusCode::OK, Json(project_json(&project))).into_response(),
        Err(e) => map_project_error(&e),
    }
}

/// PUT `/organizations/{org_id}/projects/{project_id}` - Update descriptive fields.
///
/// Budget and consumed amount are not updatable here: the budget moves
/// only through amendments and change orders, the consumed amount only
/// through approvals.
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    let status = match payload.status.as_deref() {
        None => None,
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: active, on_hold, completed, archived"
                    })),
                )
                    .into_response();
            }
        },
    };

    let project_repo = ProjectRepository::new((*state.db).clone());

    let input = UpdateProjectInput {
        name: payload.name,
        description: payload.description.map(Some),
        status,
    };

    match project_repo.update(org_id, project_id, input).await {
        Ok(project) => {
            info!(org_id = %org_id, project_id = %project_id, "Project updated");
            (StatusCode::OK, Json(project_json(&project))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update project");
            map_project_error(&e)
        }
    }
}

/// DELETE `/organizations/{org_id}/projects/{project_id}` - Archive a project.
async fn archive_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.archive(org_id, project_id).await {
        Ok(project) => {
            info!(org_id = %org_id, project_id = %project_id, "Project archived");
            (StatusCode::OK, Json(project_json(&project))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to archive project");
            map_project_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/projects/{project_id}/variance` - Current budget variance.
async fn get_variance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    match project_repo.variance(org_id, project_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "project_id": result.project.id,
                "variance": result.variance,
                "warning_threshold": WARNING_THRESHOLD,
                "critical_threshold": CRITICAL_THRESHOLD
            })),
        )
            .into_response(),
        Err(e) => map_project_error(&e),
    }
}

/// POST `/organizations/{org_id}/projects/{project_id}/budget-impact` -
/// Project the effect of a proposed cost.
///
/// Exceeding a threshold or the budget is reported as data, never as an
/// error.
async fn budget_impact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<BudgetImpactRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    if payload.proposed_cost < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_amount",
                "message": "Proposed cost must be non-negative"
            })),
        )
            .into_response();
    }

    let project_repo = ProjectRepository::new((*state.db).clone());

    let project = match project_repo.get(org_id, project_id).await {
        Ok(p) => p,
        Err(e) => return map_project_error(&e),
    };

    let impact = BudgetService::evaluate_impact(
        project.consumed_amount,
        payload.proposed_cost,
        project.budget,
    );

    (
        StatusCode::OK,
        Json(json!({
            "project_id": project.id,
            "impact": impact,
            "warning_threshold": WARNING_THRESHOLD,
            "critical_threshold": CRITICAL_THRESHOLD
        })),
    )
        .into_response()
}

// ============================================================================
// Error Mapping
// ============================================================================

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
        ProjectError::DuplicateCode(code) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_code",
                "message": format!("Project code already exists: {code}")
            })),
        )
            .into_response(),
        ProjectError::Database(_) => internal_error(),
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("active"), Some(ProjectStatus::Active));
        assert_eq!(parse_status("ON_HOLD"), Some(ProjectStatus::OnHold));
        assert_eq!(parse_status("completed"), Some(ProjectStatus::Completed));
        assert_eq!(parse_status("archived"), Some(ProjectStatus::Archived));
        assert_eq!(parse_status("deleted"), None);
    }
}
