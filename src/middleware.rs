use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::error::AppError;
use crate::services::session::SessionClaims;
use crate::state::AppState;

/// 認証済みユーザー
///
/// Authorization: Bearer ヘッダーのセッショントークンを検証して取り出す。
/// 正当性は署名検証のみで判断し、ここではDBへ問い合わせない
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::InvalidCredentials)?;

        let claims = state.session_issuer.verify(token)?;
        Ok(Self(claims))
    }
}
