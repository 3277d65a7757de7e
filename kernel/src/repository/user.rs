use crate::model::{
    id::UserId,
    user::{event::CreateUser, User},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    /// `username` is matched after lowercasing.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Hashes the password and stores the user. A taken username yields `AppError::Conflict`.
    async fn create(&self, event: CreateUser) -> AppResult<User>;
}
