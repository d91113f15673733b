use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub message: String,
    pub user: User,
}

/// 認証済みユーザーの取得
///
/// GET /api/v1/auth/currentuser
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let user = state
        .store
        .find_by_username(&claims.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(CurrentUserResponse {
        message: "認証済みユーザー".to_string(),
        user,
    }))
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

/// セッショントークンの再発行
///
/// GET /api/v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    let auth_service = AuthService::new(
        state.store.clone(),
        state.codec,
        state.session_issuer.clone(),
    );
    let (user, token) = auth_service.refresh_token(&claims.username).await?;

    Ok(Json(RefreshTokenResponse {
        message: "トークンを再発行しました".to_string(),
        user,
        token,
    }))
}
