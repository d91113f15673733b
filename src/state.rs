use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::{PgUserStore, UserStore};
use crate::services::notify::HttpBrokerChannel;
use crate::services::{NotificationDispatcher, SecretCodec, SessionIssuer};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// 認証ユーザーストア
    pub store: Arc<dyn UserStore>,
    /// パスワードコーデック
    pub codec: SecretCodec,
    /// セッショントークン発行サービス
    pub session_issuer: SessionIssuer,
    /// 通知ディスパッチャ（ブローカーチャネルは起動時に一度だけ構築）
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(db_pool: PgPool, config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool));

        // 署名シークレット不在はここで起動エラーになる
        let session_issuer = SessionIssuer::new(
            config.jwt_secret.expose_secret(),
            config.session_token_ttl_secs,
        )?;

        let channel = Arc::new(HttpBrokerChannel::new(
            config.broker_api_url.clone(),
            config.broker_vhost.clone(),
        ));
        let dispatcher = NotificationDispatcher::new(channel);

        Ok(Self {
            config,
            store,
            codec: SecretCodec,
            session_issuer,
            dispatcher,
        })
    }
}
