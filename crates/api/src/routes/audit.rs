//! Audit log routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::organizations::check_membership};
use rebar_db::{AuditRepository, OrganizationRepository};
use rebar_shared::types::pagination::{PageRequest, PageResponse};

/// Creates the audit log routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/organizations/{org_id}/audit-log", get(list_audit_log))
}

/// Query parameters for the audit log.
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    /// Filter by project.
    pub project_id: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// GET `/organizations/{org_id}/audit-log` - List audit entries, newest first.
async fn list_audit_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<AuditLogQuery>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let page = PageRequest::from_query(query.page, query.per_page);

    let audit_repo = AuditRepository::new((*state.db).clone());

    match audit_repo
        .list(org_id, query.project_id, page.offset(), page.limit())
        .await
    {
        Ok((entries, total)) => {
            let data: Vec<serde_json::Value> = entries
                .into_iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "user_id": e.user_id,
                        "action": e.action,
                        "entity_type": e.entity_type,
                        "entity_id": e.entity_id,
                        "project_id": e.project_id,
                        "detail": e.detail,
                        "created_at": e.created_at
                    })
                })
                .collect();

            let response = PageResponse::new(data, &page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list audit log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
