use crate::{
    database::{model::user::UserRow, ConnectionPool},
    password::hash_password,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    user::{event::CreateUser, normalize_username, User},
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

pub const USERNAME_TAKEN: &str = "Username already exists";

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, username, created_at, updated_at
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(User::from))
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, username, created_at, updated_at
                FROM users
                WHERE username = $1
            "#,
        )
        .bind(normalize_username(username))
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(User::from))
        .map_err(AppError::SpecificOperationError)
    }

    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let password_hash = hash_password(&event.password).await?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                INSERT INTO users (user_id, username, password_hash)
                VALUES ($1, $2, $3)
                RETURNING user_id, username, created_at, updated_at
            "#,
        )
        .bind(UserId::new())
        .bind(normalize_username(&event.username))
        .bind(password_hash)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(USERNAME_TAKEN.into())
            }
            e => AppError::SpecificOperationError(e),
        })?;

        Ok(row.into())
    }
}
