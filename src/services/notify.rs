use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

/// 通知交換機の名前
pub const EMAIL_EXCHANGE: &str = "email-notification";
/// 認証系メール通知のルーティングキー
pub const AUTH_EMAIL_ROUTING_KEY: &str = "auth-email";

/// 通知サービスへ送るメッセージエンベロープ
///
/// 構築後は不変で、そのまま直列化して発行する。フィールド名は通知サービス側の
/// 契約に合わせて camelCase
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
    pub username: String,
    pub template: String,
}

/// ブローカーへの発行チャネル
///
/// トランスポートは外部コラボレーター。ここでは発行契約だけを規定する。
/// ブローカーが受領した発行は at-least-once で配送される
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: &NotificationMessage,
    ) -> Result<(), AppError>;
}

/// ブローカーの HTTP API 経由で発行するチャネル
///
/// プロセス起動時に一度だけ構築して全リクエストで共有する。
/// reqwest::Client は内部の接続共有により並行発行に安全
#[derive(Clone)]
pub struct HttpBrokerChannel {
    http: reqwest::Client,
    api_url: String,
    vhost: String,
}

impl HttpBrokerChannel {
    pub fn new(api_url: String, vhost: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            vhost,
        }
    }
}

#[async_trait]
impl NotificationChannel for HttpBrokerChannel {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: &NotificationMessage,
    ) -> Result<(), AppError> {
        let payload =
            serde_json::to_string(message).map_err(|e| AppError::Internal(e.into()))?;
        let body = json!({
            "properties": {},
            "routing_key": routing_key,
            "payload": payload,
            "payload_encoding": "string",
        });

        let url = format!(
            "{}/api/exchanges/{}/{}/publish",
            self.api_url, self.vhost, exchange
        );
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Dispatch(e.to_string()))?;

        if let Err(e) = response.error_for_status() {
            return Err(AppError::Dispatch(e.to_string()));
        }

        Ok(())
    }
}

/// 通知ディスパッチャ
///
/// 発行は必ず永続化の成功後に行うこと（呼び出し側の不変条件）。発行失敗は
/// Dispatch エラーとして呼び出し元へ返すが、確定済みの状態変更は巻き戻さない
#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
    exchange: String,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            channel,
            exchange: EMAIL_EXCHANGE.to_string(),
        }
    }

    /// メッセージを発行する
    ///
    /// # Security
    /// メッセージ本体（リセットリンクを含む）はログに出力しない
    pub async fn publish(
        &self,
        message: &NotificationMessage,
        routing_key: &str,
        log_context: &str,
    ) -> Result<(), AppError> {
        self.channel
            .publish(&self.exchange, routing_key, message)
            .await?;

        tracing::info!(template = %message.template, "{}", log_context);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let message = NotificationMessage {
            receiver_email: Some("seller@example.com".to_string()),
            reset_link: Some("https://market.example.com/reset_password?token=abc".to_string()),
            username: "gigseller".to_string(),
            template: "forgotPassword".to_string(),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["receiverEmail"], "seller@example.com");
        assert_eq!(
            value["resetLink"],
            "https://market.example.com/reset_password?token=abc"
        );
        assert_eq!(value["username"], "gigseller");
        assert_eq!(value["template"], "forgotPassword");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        // resetPasswordSuccess は受信者メールもリンクも持たない
        let message = NotificationMessage {
            receiver_email: None,
            reset_link: None,
            username: "gigseller".to_string(),
            template: "resetPasswordSuccess".to_string(),
        };

        let value = serde_json::to_value(&message).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("receiverEmail"));
        assert!(!object.contains_key("resetLink"));
    }

    #[tokio::test]
    async fn test_dispatcher_publishes_to_email_exchange() {
        use std::sync::Arc;

        let channel = Arc::new(fakes::RecordingChannel::new());
        let dispatcher = NotificationDispatcher::new(channel.clone());

        let message = NotificationMessage {
            receiver_email: None,
            reset_link: None,
            username: "gigseller".to_string(),
            template: "resetPasswordSuccess".to_string(),
        };
        dispatcher
            .publish(&message, AUTH_EMAIL_ROUTING_KEY, "テスト発行")
            .await
            .unwrap();

        let published = channel.messages();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, EMAIL_EXCHANGE);
        assert_eq!(published[0].1, AUTH_EMAIL_ROUTING_KEY);
        assert_eq!(published[0].2, message);
    }
}
