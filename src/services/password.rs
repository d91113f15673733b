use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::UserStore;
use crate::services::notify::{
    AUTH_EMAIL_ROUTING_KEY, NotificationDispatcher, NotificationMessage,
};
use crate::services::reset_token::ResetTokenStore;
use crate::services::secret::SecretCodec;

/// パスワードライフサイクルサービス
///
/// forgot / reset / change の3フローを統括する。全フロー共通の不変条件:
/// 永続化が成功するまで通知は発行しない。リセットではパスワード更新と
/// トークン消費が単一の原子的書き込みになる
#[derive(Clone)]
pub struct PasswordService {
    store: Arc<dyn UserStore>,
    tokens: ResetTokenStore,
    codec: SecretCodec,
    dispatcher: NotificationDispatcher,
    config: Arc<Config>,
}

impl PasswordService {
    /// 新しい PasswordService を作成
    pub fn new(
        store: Arc<dyn UserStore>,
        codec: SecretCodec,
        dispatcher: NotificationDispatcher,
        config: Arc<Config>,
    ) -> Self {
        let tokens = ResetTokenStore::new(store.clone(), config.password_reset_token_ttl_secs);
        Self {
            store,
            tokens,
            codec,
            dispatcher,
            config,
        }
    }

    /// パスワードリセットをリクエスト
    ///
    /// # Security
    /// - ユーザーが存在しない場合も成功として扱い、通知も送らない（存在列挙の防止）
    /// - トークン（平文）はログに出力しない
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::info!("パスワードリセット: ユーザー不在（成功レスポンス返却）");
                return Ok(());
            }
        };

        let token = self.tokens.issue(user.id).await?;
        let reset_link = format!(
            "{}/reset_password?token={}",
            self.config.client_url, token.plain
        );

        let message = NotificationMessage {
            receiver_email: Some(user.email.clone()),
            reset_link: Some(reset_link),
            username: user.username.clone(),
            template: "forgotPassword".to_string(),
        };
        self.dispatcher
            .publish(
                &message,
                AUTH_EMAIL_ROUTING_KEY,
                "パスワードリセット通知を通知サービスへ送信",
            )
            .await?;

        Ok(())
    }

    /// リセットトークンでパスワードを再設定
    ///
    /// # Security
    /// - トークン・新パスワードはログに出力しない
    /// - 未発行・消費済み・期限切れ・差し替え済みのトークンはすべて TokenExpired
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        if password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let user = self
            .tokens
            .resolve(token)
            .await?
            .ok_or(AppError::TokenExpired)?;

        let password_hash = self.codec.hash(password)?;

        // 解決から消費までの間に再発行があると条件付き更新が外れる
        if !self.tokens.consume(user.id, token, &password_hash).await? {
            tracing::warn!(user_id = %user.id, "リセットトークンが消費前に差し替えられた");
            return Err(AppError::TokenExpired);
        }

        let message = NotificationMessage {
            receiver_email: None,
            reset_link: None,
            username: user.username.clone(),
            template: "resetPasswordSuccess".to_string(),
        };
        self.dispatcher
            .publish(
                &message,
                AUTH_EMAIL_ROUTING_KEY,
                "パスワード再設定完了通知を通知サービスへ送信",
            )
            .await?;

        tracing::info!(user_id = %user.id, "パスワードリセット完了");

        Ok(())
    }

    /// 認証済みユーザーのパスワードを変更
    ///
    /// 本人確認は現在のパスワードの照合で行う。ユーザー名は検証済みセッション
    /// クレームから渡される前提で、ここでは再検証しない
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.codec.verify(current_password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "パスワード変更: 現在のパスワード不一致");
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = self.codec.hash(new_password)?;
        self.store.update_password(user.id, &password_hash).await?;

        let message = NotificationMessage {
            receiver_email: None,
            reset_link: None,
            username: user.username.clone(),
            template: "resetPasswordSuccess".to_string(),
        };
        self.dispatcher
            .publish(
                &message,
                AUTH_EMAIL_ROUTING_KEY,
                "パスワード変更完了通知を通知サービスへ送信",
            )
            .await?;

        tracing::info!(user_id = %user.id, "パスワード変更完了");

        Ok(())
    }
}
