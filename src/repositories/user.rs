use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{CreateUser, User};
use crate::repositories::Repository;

/// User repository for database operations
pub struct UserRepository;

#[async_trait]
impl Repository<User> for UserRepository {
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(model.into())
    }

    async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }
}

// User-specific methods (not in the base trait)
impl UserRepository {
    /// Create a new user
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        input: &CreateUser,
        password_hash: &str,
    ) -> AppResult<User> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username.clone()),
            email: Set(input.email.clone()),
            password_hash: Set(password_hash.to_string()),
            is_active: Set(true),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        let result = model.insert(db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Username or email already registered".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Ok(result.into())
    }

    /// Find user by username (for login and token resolution)
    pub async fn find_by_username<C: ConnectionTrait>(
        db: &C,
        username: &str,
    ) -> AppResult<Option<User>> {
        let model = UserEntity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Check if the username or the email is already taken
    pub async fn username_or_email_exists<C: ConnectionTrait>(
        db: &C,
        username: &str,
        email: &str,
    ) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(username))
                    .add(Column::Email.eq(email)),
            )
            .count(db)
            .await?;

        Ok(count > 0)
    }

    /// Activate or deactivate an account
    pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.is_active = Set(active);

        let result = active_model.update(db).await?;
        Ok(result.into())
    }
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            password_hash: m.password_hash,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}
