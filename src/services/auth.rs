use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserStore;
use crate::services::secret::SecretCodec;
use crate::services::session::SessionIssuer;

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    codec: SecretCodec,
    sessions: SessionIssuer,
}

impl AuthService {
    /// 新しい AuthService を作成
    pub fn new(store: Arc<dyn UserStore>, codec: SecretCodec, sessions: SessionIssuer) -> Self {
        Self {
            store,
            codec,
            sessions,
        }
    }

    /// ユーザー認証を実行し、セッショントークンを発行
    ///
    /// login はメールアドレスまたはユーザー名。
    /// タイミング攻撃対策: ユーザーが存在しない場合もダミーのパスワード検証を実行
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<(User, String), AppError> {
        let user = if login.contains('@') {
            self.store.find_by_email(login).await?
        } else {
            self.store.find_by_username(login).await?
        };

        let user = match user {
            Some(user) => user,
            None => {
                // ユーザー不在でも同等の計算を行い、応答時間を揃える
                self.codec.verify_dummy(password);
                tracing::warn!("認証失敗: ユーザー不在");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.codec.verify(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "認証失敗: パスワード不一致");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .sessions
            .issue(user.id, &user.email, &user.username)?;

        tracing::info!(user_id = %user.id, "認証成功");
        Ok((user, token))
    }

    /// 認証済みユーザーのセッショントークンを再発行
    pub async fn refresh_token(&self, username: &str) -> Result<(User, String), AppError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let token = self
            .sessions
            .issue(user.id, &user.email, &user.username)?;

        Ok((user, token))
    }
}
