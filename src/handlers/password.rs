use axum::{
    Json,
    extract::{Path, State},
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::PasswordService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn password_service(state: &AppState) -> PasswordService {
    PasswordService::new(
        state.store.clone(),
        state.codec,
        state.dispatcher.clone(),
        state.config.clone(),
    )
}

// === リセットリクエスト ===

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[garde(email)]
    pub email: String,
}

/// パスワードリセットをリクエスト
///
/// PUT /api/v1/auth/forgot-password
///
/// # Security
/// 常に200を返す（ユーザー存在有無を漏洩しない）
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    password_service(&state)
        .forgot_password(&request.email)
        .await?;

    Ok(Json(MessageResponse {
        message: "パスワードリセット手順をメールで送信しました".to_string(),
    }))
}

// === パスワードリセット実行 ===

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[garde(length(min = 4, max = 12))]
    pub password: String,
    #[garde(length(min = 4, max = 12))]
    pub confirm_password: String,
}

/// リセットトークンでパスワードを再設定
///
/// PUT /api/v1/auth/reset-password/{token}
///
/// # Security
/// token, password はログに出力しない
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    password_service(&state)
        .reset_password(&token, &request.password, &request.confirm_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "パスワードを更新しました".to_string(),
    }))
}

// === パスワード変更 ===

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[garde(length(min = 4, max = 12))]
    pub current_password: String,
    #[garde(length(min = 4, max = 12))]
    pub new_password: String,
}

/// 認証済みユーザーのパスワードを変更
///
/// PUT /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    password_service(&state)
        .change_password(
            &claims.username,
            &request.current_password,
            &request.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "パスワードを更新しました".to_string(),
    }))
}
