use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("認証情報が正しくありません")]
    InvalidCredentials,

    #[error("パスワードが一致しません")]
    PasswordMismatch,

    #[error("無効または期限切れのリンクです")]
    TokenExpired,

    #[error("設定エラー: {0}")]
    Configuration(String),

    #[error("通知発行エラー: {0}")]
    Dispatch(String),

    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "認証情報が正しくありません".to_string(),
            ),
            Self::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                "パスワードが一致しません".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::BAD_REQUEST,
                // 未発行・消費済み・期限切れを区別しない（有効性の漏洩防止）
                "無効または期限切れのリンクです".to_string(),
            ),
            Self::Configuration(msg) => {
                tracing::error!(error = %msg, "設定エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::Dispatch(msg) => {
                // 状態変更は確定済み。通知の失敗だけを呼び出し元へ伝える
                tracing::error!(error = %msg, "通知サービスへの発行に失敗");
                (
                    StatusCode::BAD_GATEWAY,
                    "通知サービスとの通信に失敗しました".to_string(),
                )
            }
            Self::Database(e) => {
                tracing::error!(error = ?e, "データベースエラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
