//! Authentication routes for login, register, token refresh, and logout.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use rebar_core::auth::{hash_password, verify_password};
use rebar_db::{SessionRepository, UserRepository};
use rebar_shared::auth::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RegisterRequest, UserInfo,
    UserOrganization,
};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// POST /auth/login - Authenticate user and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    // Get user's organizations
    let orgs = match user_repo.memberships(user.id).await {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "Failed to get user organizations");
            return internal_error("An error occurred during login");
        }
    };

    // Token context is the first organization
    let Some((default_org, default_membership)) = orgs.first().cloned() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "no_organization",
                "message": "User is not a member of any organization"
            })),
        )
            .into_response();
    };

    // Generate tokens
    let role_str = default_membership.role.as_str();
    let access_token =
        match state
            .jwt_service
            .generate_access_token(user.id, default_org.id, role_str)
        {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "Failed to generate access token");
                return internal_error("An error occurred during login");
            }
        };

    let refresh_token =
        match state
            .jwt_service
            .generate_refresh_token(user.id, default_org.id, role_str)
        {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "Failed to generate refresh token");
                return internal_error("An error occurred during login");
            }
        };

    // Persist the refresh session
    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(user.id, default_org.id, &refresh_token, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to create session");
        return internal_error("An error occurred during login");
    }

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            organizations: orgs
                .into_iter()
                .map(|(org, membership)| UserOrganization {
                    id: org.id,
                    name: org.name,
                    slug: org.slug,
                    role: membership.role.as_str().to_string(),
                })
                .collect(),
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error("An error occurred during registration");
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    let user = match user_repo
        .create(&payload.email, &password_hash, &payload.full_name)
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, email = %user.email, "New user registered");

    // No tokens yet: the user needs to create or join an organization first
    (
        StatusCode::CREATED,
        Json(json!({
            "user": {
                "id": user.id,
                "email": user.email,
                "full_name": user.full_name
            },
            "message": "Registration successful. Please create or join an organization."
        })),
    )
        .into_response()
}

/// POST /auth/refresh - Refresh access token using refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    // Validate refresh token signature and expiry
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                rebar_shared::JwtError::Expired => ("token_expired", "Refresh token has expired"),
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    // The token must also map to a live session
    let session_repo = SessionRepository::new((*state.db).clone());
    match session_repo.find_by_token(&payload.refresh_token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "session_revoked",
                    "message": "Session has been revoked or expired"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let access_token = match state.jwt_service.generate_access_token(
        claims.user_id(),
        claims.organization_id(),
        &claims.role,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response()
}

/// POST /auth/logout - Revoke the refresh session.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke_by_token(&payload.refresh_token).await {
        Ok(revoked) => {
            if revoked {
                info!("Session revoked");
            }
            (
                StatusCode::OK,
                Json(json!({ "message": "Logged out" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error during logout");
            internal_error("An error occurred during logout")
        }
    }
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
