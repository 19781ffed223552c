//! Material catalog repository for database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::materials;

/// Error types for material operations.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// Material not found in the caller's organization.
    #[error("Material not found: {0}")]
    NotFound(Uuid),

    /// Unit price cannot be negative.
    #[error("Unit price cannot be negative")]
    NegativePrice,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Material repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct MaterialRepository {
    db: DatabaseConnection,
}

impl MaterialRepository {
    /// Creates a new material repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new catalog material.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative or the insert fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        name: String,
        unit: String,
        unit_price: Decimal,
        sku: Option<String>,
    ) -> Result<materials::Model, MaterialError> {
        if unit_price < Decimal::ZERO {
            return Err(MaterialError::NegativePrice);
        }

        let now = chrono::Utc::now().into();
        let material = materials::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(name),
            unit: Set(unit),
            unit_price: Set(unit_price),
            sku: Set(sku),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(material.insert(&self.db).await?)
    }

    /// Gets a material within the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is not found or the query fails.
    pub async fn get(
        &self,
        organization_id: Uuid,
        material_id: Uuid,
    ) -> Result<materials::Model, MaterialError> {
        materials::Entity::find_by_id(material_id)
            .filter(materials::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(MaterialError::NotFound(material_id))
    }

    /// Lists materials for an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<materials::Model>, MaterialError> {
        Ok(materials::Entity::find()
            .filter(materials::Column::OrganizationId.eq(organization_id))
            .order_by_asc(materials::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Updates a material's catalog rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative, the material is not
    /// found, or the update fails.
    pub async fn update_price(
        &self,
        organization_id: Uuid,
        material_id: Uuid,
        unit_price: Decimal,
    ) -> Result<materials::Model, MaterialError> {
        if unit_price < Decimal::ZERO {
            return Err(MaterialError::NegativePrice);
        }

        let material = self.get(organization_id, material_id).await?;

        let mut active: materials::ActiveModel = material.into();
        active.unit_price = Set(unit_price);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
