//! 会话令牌签发与校验
//!
//! HS256 签名的短时效令牌，sub 为本地用户 ID。
//! 密钥缺失在签发时报错而不是启动时拒绝，
//! 便于只读场景在未配置密钥的环境下运行。

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 令牌错误
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,

    #[error("token encoding failed: {0}")]
    EncodingError(String),

    #[error("token is invalid or expired: {0}")]
    InvalidToken(String),
}

/// 会话令牌声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 本地用户 ID
    pub sub: String,
    /// 签发方
    pub iss: String,
    /// 签发时间（Unix 秒）
    pub iat: usize,
    /// 生效时间
    pub nbf: usize,
    /// 过期时间
    pub exp: usize,
}

/// 会话令牌签发器
pub struct SessionTokenIssuer {
    secret: String,
    issuer: String,
    ttl_minutes: u64,
}

impl SessionTokenIssuer {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, ttl_minutes: u64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl_minutes,
        }
    }

    /// 为指定用户签发会话令牌
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let now = Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now + (self.ttl_minutes as usize) * 60,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    /// 校验令牌并返回声明
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| TokenError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionTokenIssuer {
        SessionTokenIssuer::new("test-secret", "scriven-backend", 60)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = issuer();
        let token = issuer.issue("user-42").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.iss, "scriven-backend");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_empty_secret_fails_to_sign() {
        let issuer = SessionTokenIssuer::new("", "scriven-backend", 60);
        let err = issuer.issue("user-42").unwrap_err();
        assert!(matches!(err, TokenError::MissingSecret));
    }

    #[test]
    fn test_wrong_secret_fails_to_verify() {
        let token = issuer().issue("user-42").unwrap();
        let other = SessionTokenIssuer::new("other-secret", "scriven-backend", 60);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_fails_to_verify() {
        let token = issuer().issue("user-42").unwrap();
        let other = SessionTokenIssuer::new("test-secret", "someone-else", 60);
        assert!(other.verify(&token).is_err());
    }
}
