use crate::{
    extractor::AppJson,
    model::{
        auth::{SigninRequest, SigninResponse},
        user::ensure_credentials,
    },
};
use axum::{extract::State, Json};
use kernel::model::auth::event::CreateToken;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn signin(
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<SigninRequest>,
) -> AppResult<Json<SigninResponse>> {
    ensure_credentials(&req.username, &req.password)?;

    let auth_repository = registry.auth_repository();
    let user_id = auth_repository
        .verify_user(&req.username, &req.password)
        .await?;

    // The credentials matched a row a moment ago, so a miss here is a store fault.
    let user = registry
        .user_repository()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NoRowsAffectedError(format!("user {user_id} vanished")))?;

    let token = auth_repository.create_token(CreateToken::new(user_id))?;
    tracing::info!(user.id = %user_id, "user signed in");

    Ok(Json(SigninResponse {
        user: user.into(),
        token: token.0,
    }))
}
