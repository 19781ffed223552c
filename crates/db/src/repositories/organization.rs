//! Organization repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{organization_users, organizations, sea_orm_active_enums::UserRole, users};
use crate::rls::set_rls_context;

/// Organization repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new organization with the creator as admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_admin(
        &self,
        name: &str,
        slug: &str,
        admin_id: Uuid,
    ) -> Result<organizations::Model, DbErr> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let org_id = Uuid::new_v4();
        // The tenant policy checks inserts too, so the context is the new org.
        set_rls_context(&txn, org_id).await?;

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let org = org.insert(&txn).await?;

        let org_user = organization_users::ActiveModel {
            user_id: Set(admin_id),
            organization_id: Set(org_id),
            role: Set(UserRole::Admin),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(&txn).await?;

        txn.commit().await?;

        Ok(org)
    }

    /// Adds a user to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<organization_users::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let org_user = organization_users::ActiveModel {
            user_id: Set(user_id),
            organization_id: Set(org_id),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(&self.db).await
    }

    /// Gets all users in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_users(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<(users::Model, organization_users::Model)>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map(|results| {
                results
                    .into_iter()
                    .filter_map(|(ou, user)| user.map(|u| (u, ou)))
                    .collect()
            })
    }

    /// Gets a user's membership in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_user_membership(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_users::Model>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Checks if a user is a member of an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let count = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
