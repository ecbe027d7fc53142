//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::{IdentityError, RepositoryError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{0}")]
    NotFound(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 并发写入撞上唯一约束（重试预算耗尽后上抛）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 多步操作部分成功
    ///
    /// 第一步已持久化、后续步骤失败。携带已落库的实体标识，
    /// 调用方只能补做失败的那一步，不得整体重放。
    /// 此变体不得折叠为一般性失败。
    #[error("Partial failure: {persisted_step} persisted but {failed_step} failed: {message}")]
    PartialFailure {
        persisted_step: &'static str,
        failed_step: &'static str,
        persisted_id: Uuid,
        message: String,
    },

    /// 身份凭证无效
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// 会话令牌签发失败（如缺少签名密钥）
    #[error("Signing error: {0}")]
    SigningError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found: {}", resource_type, id))
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建冲突错误
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 创建部分失败错误
    pub fn partial_failure(
        persisted_step: &'static str,
        failed_step: &'static str,
        persisted_id: Uuid,
        message: impl Into<String>,
    ) -> Self {
        Self::PartialFailure {
            persisted_step,
            failed_step,
            persisted_id,
            message: message.into(),
        }
    }

    /// 创建凭证无效错误
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential(message.into())
    }

    /// 创建签发失败错误
    pub fn signing(message: impl Into<String>) -> Self {
        Self::SigningError(message.into())
    }

    /// 创建存储错误
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

/// 仓储错误到应用错误的兜底翻译
///
/// 语义敏感的调用点（章节插入的冲突重试、存在性检查）在现场
/// 自行翻译；走到这里的是无法按现场语义细分的残余情况。
impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            // 父实体已不存在，按缺失资源上报而不是静默吞掉
            RepositoryError::ForeignKeyViolation(msg) => Self::NotFound(msg),
            RepositoryError::DatabaseError(msg) => Self::StorageError(msg),
            RepositoryError::SerializationError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<IdentityError> for ApplicationError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredential(msg) => Self::InvalidCredential(msg),
            IdentityError::NetworkError(msg) => Self::ExternalServiceError(msg),
            IdentityError::Timeout => {
                Self::ExternalServiceError("identity provider timeout".to_string())
            }
            IdentityError::ServiceError(msg) => Self::ExternalServiceError(msg),
            IdentityError::InvalidResponse(msg) => Self::ExternalServiceError(msg),
        }
    }
}
