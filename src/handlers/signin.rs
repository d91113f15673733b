use axum::{Json, extract::State};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// サインインリクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    /// ユーザー名またはメールアドレス
    #[garde(length(min = 4, max = 50))]
    pub username: String,
    #[garde(length(min = 4, max = 12))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

/// サインインハンドラー
///
/// POST /api/v1/auth/signin
///
/// # Security
/// パスワードはログに出力しない
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let auth_service = AuthService::new(
        state.store.clone(),
        state.codec,
        state.session_issuer.clone(),
    );
    let (user, token) = auth_service
        .sign_in(&request.username, &request.password)
        .await?;

    Ok(Json(SignInResponse {
        message: "ログインに成功しました".to_string(),
        user,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_short_username() {
        let request = SignInRequest {
            username: "ab".to_string(),
            password: "password".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_short_password() {
        let request = SignInRequest {
            username: "gigseller".to_string(),
            password: "abc".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_email_as_login() {
        let request = SignInRequest {
            username: "seller@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
