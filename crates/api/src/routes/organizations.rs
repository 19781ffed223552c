//! Organization management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use rebar_db::{
    OrganizationRepository, UserRepository, entities::sea_orm_active_enums::UserRole,
};
use rebar_shared::auth::{AddMemberRequest, CreateOrganizationRequest};

/// Creates the organization routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route("/organizations", get(list_organizations))
        .route("/organizations/{org_id}", get(get_organization))
        .route("/organizations/{org_id}/members", get(list_members))
        .route("/organizations/{org_id}/members", post(add_member))
}

/// Parses a role string into the database enum.
fn parse_role(s: &str) -> Option<UserRole> {
    match s.to_lowercase().as_str() {
        "admin" => Some(UserRole::Admin),
        "team_leader" => Some(UserRole::TeamLeader),
        "user" => Some(UserRole::User),
        _ => None,
    }
}

/// POST /organizations - Create a new organization with the caller as admin.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    match org_repo.slug_exists(&payload.slug).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "slug_exists",
                    "message": "An organization with this slug already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking slug");
            return internal_error();
        }
    }

    match org_repo
        .create_with_admin(&payload.name, &payload.slug, auth.user_id())
        .await
    {
        Ok(org) => {
            info!(org_id = %org.id, slug = %org.slug, "Organization created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": org.id,
                    "name": org.name,
                    "slug": org.slug,
                    "created_at": org.created_at
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create organization");
            internal_error()
        }
    }
}

/// GET /organizations - List the caller's organizations.
async fn list_organizations(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.memberships(auth.user_id()).await {
        Ok(orgs) => {
            let response: Vec<serde_json::Value> = orgs
                .into_iter()
                .map(|(org, membership)| {
                    json!({
                        "id": org.id,
                        "name": org.name,
                        "slug": org.slug,
                        "role": membership.role.as_str()
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "organizations": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list organizations");
            internal_error()
        }
    }
}

/// GET /organizations/{org_id} - Get an organization the caller belongs to.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    match org_repo.find_by_id(org_id).await {
        Ok(Some(org)) => (
            StatusCode::OK,
            Json(json!({
                "id": org.id,
                "name": org.name,
                "slug": org.slug,
                "is_active": org.is_active,
                "created_at": org.created_at
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Organization not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get organization");
            internal_error()
        }
    }
}

/// GET /organizations/{org_id}/members - List organization members.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    match org_repo.get_users(org_id).await {
        Ok(members) => {
            let response: Vec<serde_json::Value> = members
                .into_iter()
                .map(|(user, membership)| {
                    json!({
                        "id": user.id,
                        "email": user.email,
                        "full_name": user.full_name,
                        "role": membership.role.as_str(),
                        "joined_at": membership.created_at
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "members": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list members");
            internal_error()
        }
    }
}

/// POST /organizations/{org_id}/members - Add a user to the organization.
///
/// Only admins may add members.
async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    match org_repo.get_user_membership(org_id, auth.user_id()).await {
        Ok(Some(membership)) if membership.role == UserRole::Admin => {}
        Ok(Some(_)) => {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "Admin role required"
                })),
            )
                .into_response();
        }
        Ok(None) => {
            return not_a_member();
        }
        Err(e) => {
            error!(error = %e, "Failed to check membership");
            return internal_error();
        }
    }

    let Some(role) = parse_role(&payload.role) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_role",
                "message": "Role must be one of: admin, team_leader, user"
            })),
        )
            .into_response();
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "user_not_found",
                    "message": "No account exists with this email"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error finding user");
            return internal_error();
        }
    };

    match org_repo.get_user_membership(org_id, user.id).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_member",
                    "message": "User is already a member of this organization"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check existing membership");
            return internal_error();
        }
    }

    match org_repo.add_user(org_id, user.id, role).await {
        Ok(membership) => {
            info!(org_id = %org_id, user_id = %user.id, role = membership.role.as_str(), "Member added");
            (
                StatusCode::CREATED,
                Json(json!({
                    "user_id": user.id,
                    "organization_id": org_id,
                    "role": membership.role.as_str()
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to add member");
            internal_error()
        }
    }
}

/// Checks if user is a member of the organization.
pub(crate) async fn check_membership(
    org_repo: &OrganizationRepository,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<(), axum::response::Response> {
    match org_repo.is_member(org_id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(not_a_member()),
        Err(e) => {
            error!(error = %e, "Failed to check membership");
            Err(internal_error())
        }
    }
}

fn not_a_member() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": "You are not a member of this organization"
        })),
    )
        .into_response()
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
