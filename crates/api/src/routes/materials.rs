//! Material catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
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
    MaterialRepository, OrganizationRepository, repositories::material::MaterialError,
};

/// Creates the material routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/materials", post(create_material))
        .route("/organizations/{org_id}/materials", get(list_materials))
        .route(
            "/organizations/{org_id}/materials/{material_id}/price",
            put(update_price),
        )
}

/// Request body for creating a material.
#[derive(Debug, Deserialize)]
pub struct CreateMaterialRequest {
    /// Material name.
    pub name: String,
    /// Unit of measure.
    pub unit: String,
    /// Catalog rate per unit.
    pub unit_price: Decimal,
    /// Optional SKU.
    pub sku: Option<String>,
}

/// Request body for updating a material's catalog rate.
#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    /// New rate per unit.
    pub unit_price: Decimal,
}

fn material_json(material: &rebar_db::entities::materials::Model) -> serde_json::Value {
    json!({
        "id": material.id,
        "name": material.name,
        "unit": material.unit,
        "unit_price": material.unit_price,
        "sku": material.sku,
        "updated_at": material.updated_at
    })
}

/// POST `/organizations/{org_id}/materials` - Create a catalog material.
async fn create_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateMaterialRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    let material_repo = MaterialRepository::new((*state.db).clone());

    match material_repo
        .create(
            org_id,
            payload.name,
            payload.unit,
            payload.unit_price,
            payload.sku,
        )
        .await
    {
        Ok(material) => {
            info!(org_id = %org_id, material_id = %material.id, "Material created");
            (StatusCode::CREATED, Json(material_json(&material))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create material");
            map_material_error(&e)
        }
    }
}

/// GET `/organizations/{org_id}/materials` - List catalog materials.
async fn list_materials(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) = check_membership(&org_repo, org_id, auth.user_id()).await {
        return response;
    }

    let material_repo = MaterialRepository::new((*state.db).clone());

    match material_repo.list(org_id).await {
        Ok(materials) => {
            let response: Vec<serde_json::Value> = materials.iter().map(material_json).collect();
            (StatusCode::OK, Json(json!({ "materials": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list materials");
            map_material_error(&e)
        }
    }
}

/// PUT `/organizations/{org_id}/materials/{material_id}/price` - Update the catalog rate.
///
/// Existing allocations keep the rate they were created with.
async fn update_price(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, material_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePriceRequest>,
) -> impl IntoResponse {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    if let Err(response) =
        require_capability(&org_repo, org_id, auth.user_id(), Capability::ManageProjects).await
    {
        return response;
    }

    let material_repo = MaterialRepository::new((*state.db).clone());

    match material_repo
        .update_price(org_id, material_id, payload.unit_price)
        .await
    {
        Ok(material) => {
            info!(org_id = %org_id, material_id = %material_id, "Material price updated");
            (StatusCode::OK, Json(material_json(&material))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update material price");
            map_material_error(&e)
        }
    }
}

/// Maps material errors to HTTP responses.
fn map_material_error(e: &MaterialError) -> axum::response::Response {
    match e {
        MaterialError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Material not found: {id}")
            })),
        )
            .into_response(),
        MaterialError::NegativePrice => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_price",
                "message": "Unit price cannot be negative"
            })),
        )
            .into_response(),
        MaterialError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
