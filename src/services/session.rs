use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// セッショントークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// ユーザーID
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    /// 発行時刻（UNIX秒）
    pub iat: i64,
    /// 有効期限（UNIX秒）
    pub exp: i64,
}

/// セッショントークン発行サービス
///
/// 入力と署名シークレットだけで決まる純粋な発行。シークレットはプロセス起動時に
/// 一度だけ読み込み、以後不変
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionIssuer {
    /// 署名シークレットから発行サービスを構築
    ///
    /// シークレット未設定は起動時エラー。リクエスト処理中には発生させない
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Configuration(
                "JWT_SECRET が設定されていません".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        })
    }

    /// ユーザーのIDクレームに署名したセッショントークンを発行
    pub fn issue(&self, user_id: Uuid, email: &str, username: &str) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = ?e, "セッショントークンの署名に失敗");
            AppError::Internal(anyhow::anyhow!("session token signing error"))
        })
    }

    /// ベアラートークンを検証してクレームを取り出す
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new("test-signing-secret", 3600).unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "gig@example.com", "gigseller").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "gig@example.com");
        assert_eq!(claims.username, "gigseller");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue(Uuid::new_v4(), "gig@example.com", "gigseller")
            .unwrap();

        let mut tampered = token;
        tampered.push('x');
        assert!(matches!(
            issuer.verify(&tampered),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = issuer();
        let other = SessionIssuer::new("another-secret", 3600).unwrap();
        let token = other
            .issue(Uuid::new_v4(), "gig@example.com", "gigseller")
            .unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_missing_secret_is_a_configuration_error() {
        assert!(matches!(
            SessionIssuer::new("", 3600),
            Err(AppError::Configuration(_))
        ));
    }
}
