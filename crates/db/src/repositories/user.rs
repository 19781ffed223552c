//! User accounts and their organization memberships.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{organization_users, organizations, users};

/// User repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up a user by email. Emails are unique across the system;
    /// accounts are not tenant-scoped, memberships are.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Whether an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Registers a new active user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate email
    /// hitting the unique constraint).
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            full_name: Set(full_name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Every organization the user belongs to, paired with the membership
    /// row that carries their role there.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(organizations::Model, organization_users::Model)>, DbErr> {
        let rows = organization_users::Entity::find()
            .filter(organization_users::Column::UserId.eq(user_id))
            .find_also_related(organizations::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, org)| org.map(|o| (o, membership)))
            .collect())
    }
}
