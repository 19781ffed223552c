//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod alerts;
pub mod audit;
pub mod auth;
pub mod budget_changes;
pub mod cost_allocations;
pub mod health;
pub mod line_items;
pub mod materials;
pub mod organizations;
pub mod projects;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(organizations::routes())
        .merge(projects::routes())
        .merge(line_items::routes())
        .merge(materials::routes())
        .merge(cost_allocations::routes())
        .merge(budget_changes::routes())
        .merge(alerts::routes())
        .merge(audit::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
