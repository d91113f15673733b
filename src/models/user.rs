use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// 認証ユーザー
///
/// リセットトークンはSHA256ダイジェストのみ保存する（平文はリセットリンクにだけ
/// 載せ、DBには残さない）。reset_token_hash と reset_token_expires_at は
/// リセットフローが保留中のときだけ揃って存在し、消費・上書き時には
/// パスワード更新と同一の書き込みで揃ってクリアされる
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub reset_token_hash: Option<String>,
    #[serde(skip)]
    pub reset_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
