//! Budget alert routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
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
    AlertRepository, OrganizationRepository,
    entities::{budget_alerts, sea_orm_active_enums::AlertStatus},
    repositories::alert::AlertError,
};

/// Creates the alert routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/alerts", get(list_alerts))
        .route(
            "/organizations/{org_id}/alerts/{alert_id}/acknowledge",
            post(acknowledge_alert),
        )
        .route(
            "/organizations/{org_id}/alerts/{alert_id}/resolve",
            post(resolve_alert),
        )
}

/// Query parameters for listing alerts.
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    /// Filter by project.
    pub project_id: Option<Uuid>,
    /// Filter by status: active, acknowledged, resolved.
    pub status: Option<String>,
}

/// Parses an alert status string.
fn parse_status(s: &str) -> Option<AlertStatus> {
    match s.to_lowercase().as_str() {
        "active" => Some(AlertStatus::Active),
        "acknowledged" => Some(AlertStatus::Acknowledged),
        "resolved" => Some(AlertStatus::Resolved),
        _ => None,
    }
}

fn alert_json(alert: &budget_alerts::Model) -> serde_json::Value {
    json!({
        "id": alert.id,
        "project_id": alert.project_id,
        "alert_type": alert.alert_type,
        "severity": alert.severity,
        "message": alert.message,
        "status": alert.status,
        "acknowledged_by": alert.acknowledged_by,
        "acknowledged_at": alert.acknowledged_at,
        "resolved_by": alert.resolved_by,
        "resolved_at": alert.resolved_at,
        "created_at": alert.created_at
    })
}

/// GET `/organizations/{org_id}/alerts` - List alerts.
async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListAlertsQuery>,
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
                        "message": "Status must be one of: active, acknowledged, resolved"
                    })),
                )
                    .into_response();
            }
        },
    };

    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.list(org_id, query.project_id, status).await {
        Ok(alerts) => {
            let response: Vec<serde_json::Value> = alerts.iter().map(alert_json).collect();
            (StatusCode::OK, Json(json!({ "alerts": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list alerts");
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

/// POST `/organizations/{org_id}/alerts/{alert_id}/acknowledge` -
/// Acknowledge an active alert.
async fn acknowledge_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, alert_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageAlerts).await
    {
        return response;
    }

    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.acknowledge(org_id, alert_id, auth.user_id()).await {
        Ok(alert) => {
            info!(org_id = %org_id, alert_id = %alert_id, "Alert acknowledged");
            (StatusCode::OK, Json(alert_json(&alert))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to acknowledge alert");
            map_alert_error(&e)
        }
    }
}

/// POST `/organizations/{org_id}/alerts/{alert_id}/resolve` -
/// Resolve an alert. The same condition recurring later raises a fresh one.
async fn resolve_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, alert_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageAlerts).await
    {
        return response;
    }

    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.resolve(org_id, alert_id, auth.user_id()).await {
        Ok(alert) => {
            info!(org_id = %org_id, alert_id = %alert_id, "Alert resolved");
            (StatusCode::OK, Json(alert_json(&alert))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to resolve alert");
            map_alert_error(&e)
        }
    }
}

/// Maps alert errors to HTTP responses.
fn map_alert_error(e: &AlertError) -> axum::response::Response {
    match e {
        AlertError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Alert not found: {id}")
            })),
        )
            .into_response(),
        AlertError::InvalidStatus { actual, expected } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "invalid_status",
                "message": format!("Alert is {actual}, expected {expected}")
            })),
        )
            .into_response(),
        AlertError::Database(_) => (
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
        assert_eq!(parse_status("active"), Some(AlertStatus::Active));
        assert_eq!(
            parse_status("Acknowledged"),
            Some(AlertStatus::Acknowledged)
        );
        assert_eq!(parse_status("resolved"), Some(AlertStatus::Resolved));
        assert_eq!(parse_status("dismissed"), None);
    }
}
