//! Line item repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{line_items, projects};

/// Error types for line item operations.
#[derive(Debug, Error)]
pub enum LineItemError {
    /// Line item not found in the caller's organization.
    #[error("Line item not found: {0}")]
    NotFound(Uuid),

    /// Project not found in the caller's organization.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Line item code already exists for this project.
    #[error("Line item code already exists: {0}")]
    DuplicateCode(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Line item repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct LineItemRepository {
    db: DatabaseConnection,
}

impl LineItemRepository {
    /// Creates a new line item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new line item under a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not in the caller's
    /// organization, the code is taken for the project, or the insert
    /// fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        code: String,
        name: String,
        description: Option<String>,
    ) -> Result<line_items::Model, LineItemError> {
        projects::Entity::find_by_id(project_id)
            .filter(projects::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(LineItemError::ProjectNotFound(project_id))?;

        let existing = line_items::Entity::find()
            .filter(line_items::Column::ProjectId.eq(project_id))
            .filter(line_items::Column::Code.eq(&code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(LineItemError::DuplicateCode(code));
        }

        let now = chrono::Utc::now().into();
        let item = line_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            project_id: Set(project_id),
            code: Set(code),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(item.insert(&self.db).await?)
    }

    /// Gets a line item within the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the line item is not found or the query fails.
    pub async fn get(
        &self,
        organization_id: Uuid,
        line_item_id: Uuid,
    ) -> Result<line_items::Model, LineItemError> {
        line_items::Entity::find_by_id(line_item_id)
            .filter(line_items::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(LineItemError::NotFound(line_item_id))
    }

    /// Lists line items for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<line_items::Model>, LineItemError> {
        Ok(line_items::Entity::find()
            .filter(line_items::Column::OrganizationId.eq(organization_id))
            .filter(line_items::Column::ProjectId.eq(project_id))
            .order_by_asc(line_items::Column::Code)
            .all(&self.db)
            .await?)
    }
}
