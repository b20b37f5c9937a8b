//! User repository for account storage and login lookups.
//!
//! Password hashing lives in `printdesk-core::auth`; this repository only
//! stores and returns the PHC-format hash.

use chrono::{DateTime, Utc};
use printdesk_core::auth::UserRole;
use printdesk_shared::types::id::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login email, unique.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: UserRole,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` when the email is already registered.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&input.email))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(UserError::EmailTaken(input.email));
        }

        let now: DateTime<Utc> = Utc::now();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            email: Set(input.email),
            full_name: Set(input.full_name),
            role: Set(input.role.into()),
            password_hash: Set(input.password_hash),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(user.insert(&self.db).await?)
    }

    /// Looks up a user by login email. `None` when unknown, so the caller
    /// can return the same error for bad email and bad password.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Fetches one user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<users::Model, UserError> {
        let id = user_id.into_inner();
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Lists all users, alphabetically by name.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_users(&self) -> Result<Vec<users::Model>, UserError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await?)
    }

    /// Enables or disables a user account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn set_active(&self, user_id: UserId, is_active: bool) -> Result<users::Model, UserError> {
        let user = self.get_user(user_id).await?;
        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}
