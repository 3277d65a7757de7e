use crate::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Checks a username/password pair. Unknown users and wrong passwords fail
    /// alike with `AppError::UnauthenticatedError`.
    async fn verify_user(&self, username: &str, password: &str) -> AppResult<UserId>;
    /// Verifies signature and expiry and returns the token subject.
    fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId>;
    fn create_token(&self, event: CreateToken) -> AppResult<AccessToken>;
}
