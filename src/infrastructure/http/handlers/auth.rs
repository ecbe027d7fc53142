//! Auth HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{LoginWithIdentityToken, LoginWithPassword};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IdentityLoginRequest {
    pub identity_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 外部身份令牌登录，本地无账号时首登建档
pub async fn login_with_identity_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdentityLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let command = LoginWithIdentityToken {
        identity_token: req.identity_token,
    };

    let result = state.login_identity_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        user_id: result.user_id,
        email: result.email,
        display_name: result.display_name,
    })))
}

/// 邮箱口令登录
pub async fn login_with_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let command = LoginWithPassword {
        email: req.email,
        password: req.password,
    };

    let result = state.login_password_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        user_id: result.user_id,
        email: result.email,
        display_name: result.display_name,
    })))
}
