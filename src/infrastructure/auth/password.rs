//! 口令散列与比对
//!
//! bcrypt 单向散列；明文永不落库。

use bcrypt::DEFAULT_COST;
use thiserror::Error;

/// 口令处理错误
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashError(String),

    #[error("password verification failed: {0}")]
    VerifyError(String),
}

/// 生成口令的 bcrypt 散列
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plain, DEFAULT_COST).map_err(|e| PasswordError::HashError(e.to_string()))
}

/// 比对明文口令与存储的散列
///
/// 散列本身损坏时返回 Err，口令不匹配返回 Ok(false)。
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plain, hashed).map_err(|e| PasswordError::VerifyError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong horse", &hashed).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
