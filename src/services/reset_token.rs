use std::sync::Arc;

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserStore;

/// 発行済みリセットトークン
///
/// plain はリセットリンクにのみ載せる。永続化されるのはダイジェストだけ
#[derive(Debug)]
pub struct IssuedToken {
    pub plain: String,
    pub expires_at: OffsetDateTime,
}

/// パスワードリセットトークンの発行・解決・消費
///
/// ユーザーごとに有効なトークンは常に1つ。再発行は前のトークンを黙って無効化する
#[derive(Clone)]
pub struct ResetTokenStore {
    store: Arc<dyn UserStore>,
    ttl: Duration,
}

impl ResetTokenStore {
    pub fn new(store: Arc<dyn UserStore>, ttl_secs: i64) -> Self {
        Self {
            store,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// 新しいトークンを発行してユーザーに紐付ける
    ///
    /// 20バイトのCSPRNG乱数をhexエンコードしたものがトークン値になる
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        let mut bytes = [0u8; 20];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        let plain = hex::encode(bytes);
        let expires_at = OffsetDateTime::now_utc() + self.ttl;

        self.store
            .set_reset_token(user_id, &hash_token(&plain), expires_at)
            .await?;

        Ok(IssuedToken { plain, expires_at })
    }

    /// トークンからユーザーを解決する
    ///
    /// # Security
    /// 未発行・消費済み・期限切れはすべて None で、呼び出し側からは区別できない。
    /// 参照のみで状態は変更しない
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, AppError> {
        let user = match self.store.find_by_reset_token(&hash_token(token)).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        match user.reset_token_expires_at {
            Some(expires_at) if expires_at >= OffsetDateTime::now_utc() => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// トークンを消費しつつパスワードハッシュを更新する
    ///
    /// ダイジェスト一致を条件とする単一の条件付き更新として実行される。
    /// 解決後に別トークンへ差し替わっていた場合は false
    pub async fn consume(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        self.store
            .consume_reset_token(user_id, &hash_token(token), password_hash)
            .await
    }
}

/// トークンをSHA256でダイジェスト化
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
