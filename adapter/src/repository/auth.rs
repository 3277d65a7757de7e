use crate::{
    database::{model::user::UserCredentialRow, ConnectionPool},
    password::verify_password,
    token::TokenService,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
    user::normalize_username,
};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    tokens: TokenService,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn verify_user(&self, username: &str, password: &str) -> AppResult<UserId> {
        let user = sqlx::query_as::<_, UserCredentialRow>(
            r#"
                SELECT user_id, password_hash
                FROM users
                WHERE username = $1
            "#,
        )
        .bind(normalize_username(username))
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::UnauthenticatedError(INVALID_CREDENTIALS.into()))?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::UnauthenticatedError(INVALID_CREDENTIALS.into()));
        }

        Ok(user.user_id)
    }

    fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId> {
        self.tokens.verify(access_token)
    }

    fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        self.tokens.issue(event.user_id)
    }
}
