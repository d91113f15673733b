use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::AppError;

/// ダミー検証用のハッシュ（実在するユーザーのものではない）
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$RWh6";

/// パスワードの一方向ハッシュ化と検証を担う能力オブジェクト
///
/// 状態を持たず、必要とするサービスへ値として注入する
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretCodec;

impl SecretCodec {
    /// 平文パスワードをargon2idでハッシュ化
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
                AppError::Internal(anyhow::anyhow!("password hash error"))
            })?;
        Ok(hash.to_string())
    }

    /// 平文パスワードを保存済みハッシュと照合
    ///
    /// argon2 の照合は不一致位置に依存しない時間で完了する
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(stored).map_err(|e| {
            tracing::error!(error = ?e, "パスワードハッシュのパースエラー");
            AppError::Internal(anyhow::anyhow!("password hash parse error"))
        })?;

        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// ダミー検証
    ///
    /// ユーザー不在時にも同等の計算を行い、応答時間からの存在推測を防ぐ
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, DUMMY_HASH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_roundtrip() {
        let codec = SecretCodec;
        let hash = codec.hash("correct horse").unwrap();
        assert!(codec.verify("correct horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let codec = SecretCodec;
        let hash = codec.hash("correct horse").unwrap();
        assert!(!codec.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        // 同じ平文でもソルトにより異なるハッシュになる
        let codec = SecretCodec;
        let first = codec.hash("password123").unwrap();
        let second = codec.hash("password123").unwrap();
        assert_ne!(first, second);
        assert!(codec.verify("password123", &first).unwrap());
        assert!(codec.verify("password123", &second).unwrap());
    }

    #[test]
    fn test_empty_plaintext_is_hashable() {
        // 空文字の拒否は呼び出し側の責務。コーデック層では有効な入力として扱う
        let codec = SecretCodec;
        let hash = codec.hash("").unwrap();
        assert!(codec.verify("", &hash).unwrap());
        assert!(!codec.verify("non-empty", &hash).unwrap());
    }

    #[test]
    fn test_corrupt_stored_hash_is_an_error() {
        let codec = SecretCodec;
        assert!(codec.verify("password123", "invalid_hash_format").is_err());
    }
}
