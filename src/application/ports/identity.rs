//! Identity Verifier Port - 外部身份校验抽象
//!
//! 定义身份令牌校验的抽象接口，具体实现在 infrastructure/auth 层

use async_trait::async_trait;
use thiserror::Error;

/// 身份校验错误
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 校验通过的身份断言
///
/// `subject` 是外部提供方的主体标识。本地没有对应用户
/// 属于正常情况，由登录流程即时建档，不在此层报错。
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// 外部主体标识
    pub subject: String,
    /// 邮箱声明
    pub email: Option<String>,
    /// 显示名声明
    pub display_name: Option<String>,
}

/// Identity Verifier Port
///
/// 外部身份提供方的抽象接口
#[async_trait]
pub trait IdentityVerifierPort: Send + Sync {
    /// 校验身份令牌，返回主体标识与随附声明
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}
