//! HTTP Error Handling
//!
//! 业务结果统一走 HTTP 200 + errno，客户端只看 errno 字段

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }

    pub fn with_data(errno: i32, error: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            errno,
            error: error.into(),
            data: Some(data),
        }
    }
}

/// 错误码定义
pub mod errno {
    /// 两步写入中第一步已持久化
    pub const PARTIAL_FAILURE: i32 = 207;
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    /// 第一步已落库而第二步失败，data 里带上已持久化的实体信息
    PartialFailure {
        persisted_step: &'static str,
        failed_step: &'static str,
        persisted_id: Uuid,
        message: String,
    },
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg.clone())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg.clone())
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!(errno = errno::UNAUTHORIZED, error = %msg, "Unauthorized");
                ErrorResponse::new(errno::UNAUTHORIZED, msg.clone())
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = errno::CONFLICT, error = %msg, "Resource conflict");
                ErrorResponse::new(errno::CONFLICT, msg.clone())
            }
            ApiError::PartialFailure {
                persisted_step,
                failed_step,
                persisted_id,
                message,
            } => {
                tracing::error!(
                    errno = errno::PARTIAL_FAILURE,
                    persisted_step,
                    failed_step,
                    persisted_id = %persisted_id,
                    error = %message,
                    "Partial failure"
                );
                ErrorResponse::with_data(
                    errno::PARTIAL_FAILURE,
                    message.clone(),
                    json!({
                        "persisted_step": persisted_step,
                        "failed_step": failed_step,
                        "persisted_id": persisted_id,
                    }),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg.clone())
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::PartialFailure {
                persisted_step,
                failed_step,
                persisted_id,
                message,
            } => ApiError::PartialFailure {
                persisted_step,
                failed_step,
                persisted_id,
                message,
            },
            ApplicationError::InvalidCredential(msg) => ApiError::Unauthorized(msg),
            ApplicationError::SigningError(msg) => ApiError::Internal(msg),
            ApplicationError::ExternalServiceError(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_maps_to_errno_207() {
        let id = Uuid::new_v4();
        let api: ApiError = ApplicationError::partial_failure("novel", "first_chapter", id, "boom")
            .into();
        match api {
            ApiError::PartialFailure {
                persisted_step,
                failed_step,
                persisted_id,
                ..
            } => {
                assert_eq!(persisted_step, "novel");
                assert_eq!(failed_step, "first_chapter");
                assert_eq!(persisted_id, id);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_credential_maps_to_unauthorized() {
        let api: ApiError = ApplicationError::invalid_credential("invalid email or password").into();
        assert!(matches!(api, ApiError::Unauthorized(_)));
    }
}
