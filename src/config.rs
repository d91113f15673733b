use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    /// セッショントークン署名シークレット
    pub jwt_secret: SecretBox<String>,
    /// パスワードリセットリンクの先頭に付くクライアントURL
    pub client_url: String,
    /// 通知ブローカー HTTP API のベースURL
    pub broker_api_url: String,
    #[serde(default = "default_broker_vhost")]
    pub broker_vhost: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // パスワードリセット設定
    #[serde(default = "default_password_reset_token_ttl_secs")]
    pub password_reset_token_ttl_secs: i64,

    // セッショントークン設定
    #[serde(default = "default_session_token_ttl_secs")]
    pub session_token_ttl_secs: i64,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BROKER_VHOST: &str = "%2f";
const DEFAULT_PASSWORD_RESET_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_SESSION_TOKEN_TTL_SECS: i64 = 86400;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_broker_vhost() -> String {
    DEFAULT_BROKER_VHOST.to_string()
}

fn default_password_reset_token_ttl_secs() -> i64 {
    DEFAULT_PASSWORD_RESET_TOKEN_TTL_SECS
}

fn default_session_token_ttl_secs() -> i64 {
    DEFAULT_SESSION_TOKEN_TTL_SECS
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
