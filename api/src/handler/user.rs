use crate::{
    extractor::AppJson,
    model::user::{ensure_credentials, CreateUserRequest, UserResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub const USERNAME_TAKEN: &str = "Username already exists";

pub async fn register_user(
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    ensure_credentials(&req.username, &req.password)?;
    req.validate(&())?;

    let user_repository = registry.user_repository();
    if user_repository.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }

    let user = user_repository.create(req.into()).await?;
    tracing::info!(user.id = %user.id, user.username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}
