pub mod user;

#[cfg(test)]
pub mod memory;

pub use user::PgUserStore;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

/// 認証ユーザーの永続ストア
///
/// 本番実装は PgUserStore。テストではインメモリのフェイクに差し替える。
/// リクエスト横断の安全性はすべて consume_reset_token の条件付き書き込みに
/// 委ねており、ストア実装はこの原子性を保証すること
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// リセットトークンのダイジェストでユーザーを検索
    ///
    /// # Note
    /// 有効期限の判定は呼び出し側で行う。参照のみで状態は変更しない
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, AppError>;

    /// リセットトークンを登録
    ///
    /// 同一ユーザーの未消費トークンは上書きされる（有効なトークンは常に1つ）
    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AppError>;

    /// パスワードハッシュを更新し、保留中のリセットトークンを同一文でクリア
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// トークン消費を伴うパスワード更新
    ///
    /// ダイジェストが一致する場合のみ適用される条件付きの単一更新。
    /// 消費の途中で新しいトークンが発行されていた場合は false を返し、
    /// 新しいトークンを壊さない
    async fn consume_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<bool, AppError>;
}
