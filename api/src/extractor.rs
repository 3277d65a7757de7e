use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use kernel::model::{auth::AccessToken, id::UserId, user::User};
use registry::AppRegistry;
use shared::error::AppError;

pub const LOGIN_REQUIRED: &str = "Please login to continue";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const USER_NOT_FOUND: &str = "User not found";

/// The caller resolved from a valid bearer token.
pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::UnauthenticatedError(LOGIN_REQUIRED.into()))?;

        let access_token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .map(|token| AccessToken(token.to_string()))
            .ok_or_else(|| AppError::UnauthenticatedError(INVALID_TOKEN.into()))?;

        let user_id = registry
            .auth_repository()
            .fetch_user_id_from_token(&access_token)
            .map_err(|_| AppError::UnauthenticatedError(INVALID_TOKEN.into()))?;

        let user = registry
            .user_repository()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UnauthenticatedError(USER_NOT_FOUND.into()))?;

        Ok(Self { access_token, user })
    }
}

/// The second whitespace-separated token of an `Authorization` value,
/// i.e. `<token>` in `Bearer <token>`.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.split_whitespace().nth(1)
}

/// `axum::Json` whose rejection is rendered as an `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` whose rejection is rendered as an `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
