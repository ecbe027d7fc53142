//! Auth Infrastructure - 身份与会话基础设施
//!
//! - jwt: 会话令牌签发与校验
//! - password: 口令散列与比对
//! - verifier: 外部身份校验客户端（HTTP 与固定表两种实现）

mod jwt;
mod password;
mod verifier;

pub use jwt::{SessionClaims, SessionTokenIssuer, TokenError};
pub use password::{hash_password, verify_password, PasswordError};
pub use verifier::{HttpIdentityVerifier, HttpIdentityVerifierConfig, StaticIdentityVerifier};
