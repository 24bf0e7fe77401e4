/*
 * Responsibility
 * - POST /users (アカウント作成), POST /me (login), GET /me (auth 必須)
 * - Json を extractor で受け、service 呼び出し → DTO へ詰め替え
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::users::{CredentialsRequest, LoginResponse, MeResponse, MessageResponse},
        extractors::{CurrentUser, JsonBody},
    },
    error::AppError,
    state::AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.create(req.into()).await?;

    Ok(Json(MessageResponse::ok("account has been created")))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let access_token = state.accounts.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        access_token,
        token_type: "Bearer",
        expires_in: state.accounts.token_ttl_seconds(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    // A valid token for an account that no longer exists ends up as 404 here.
    let row = state.accounts.get(user.user_id()).await?;

    Ok(Json(MeResponse {
        success: true,
        user: row.into(),
    }))
}
