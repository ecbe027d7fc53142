//! Auth Command Handlers - 登录与即时建档
//!
//! 外部令牌登录对本地未知的主体即时建档；口令登录不区分
//! "用户不存在"与"口令错误"，避免账号枚举。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{LoginWithIdentityToken, LoginWithPassword};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    IdentityVerifierPort, RepositoryError, UserRecord, UserRepositoryPort,
};
use crate::infrastructure::auth::{verify_password, SessionTokenIssuer};

// ============================================================================
// Responses
// ============================================================================

/// 登录响应
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

// ============================================================================
// LoginWithIdentityToken
// ============================================================================

/// LoginWithIdentityToken Handler
pub struct LoginWithIdentityTokenHandler {
    verifier: Arc<dyn IdentityVerifierPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
    token_issuer: Arc<SessionTokenIssuer>,
}

impl LoginWithIdentityTokenHandler {
    pub fn new(
        verifier: Arc<dyn IdentityVerifierPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        token_issuer: Arc<SessionTokenIssuer>,
    ) -> Self {
        Self {
            verifier,
            user_repo,
            token_issuer,
        }
    }

    pub async fn handle(
        &self,
        command: LoginWithIdentityToken,
    ) -> Result<LoginResponse, ApplicationError> {
        if command.identity_token.trim().is_empty() {
            return Err(ApplicationError::validation(
                "identity_token must not be empty",
            ));
        }

        let identity = self.verifier.verify(&command.identity_token).await?;

        // 本地无此主体属于正常情况，即时建档
        let user = match self.user_repo.find_by_external_uid(&identity.subject).await? {
            Some(user) => user,
            None => {
                let now = Utc::now();
                let display_name = identity
                    .display_name
                    .clone()
                    .or_else(|| identity.email.clone())
                    .unwrap_or_else(|| "Writer".to_string());
                let user = UserRecord {
                    id: Uuid::new_v4().to_string(),
                    external_uid: Some(identity.subject.clone()),
                    email: identity.email.clone().unwrap_or_default(),
                    display_name,
                    password_hash: None,
                    created_at: now,
                    updated_at: now,
                };

                match self.user_repo.create(&user).await {
                    Ok(()) => {
                        tracing::info!(
                            user_id = %user.id,
                            subject = %identity.subject,
                            "User provisioned on first login"
                        );
                        user
                    }
                    // 两个首登请求并发建档：输掉的一方复用已存在的记录
                    Err(RepositoryError::Conflict(_)) => self
                        .user_repo
                        .find_by_external_uid(&identity.subject)
                        .await?
                        .ok_or_else(|| {
                            ApplicationError::internal(
                                "user disappeared after conflicting provision",
                            )
                        })?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let token = self
            .token_issuer
            .issue(&user.id)
            .map_err(|e| ApplicationError::signing(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in with identity token");

        Ok(LoginResponse {
            token,
            user_id: user.id,
            email: user.email,
            display_name: user.display_name,
        })
    }
}

// ============================================================================
// LoginWithPassword
// ============================================================================

/// LoginWithPassword Handler
pub struct LoginWithPasswordHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    token_issuer: Arc<SessionTokenIssuer>,
}

impl LoginWithPasswordHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, token_issuer: Arc<SessionTokenIssuer>) -> Self {
        Self {
            user_repo,
            token_issuer,
        }
    }

    pub async fn handle(
        &self,
        command: LoginWithPassword,
    ) -> Result<LoginResponse, ApplicationError> {
        let mut violations = Vec::new();
        if command.email.trim().is_empty() {
            violations.push("email must not be empty");
        }
        if command.password.is_empty() {
            violations.push("password must not be empty");
        }
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        let user = match self.user_repo.find_by_email(&command.email).await? {
            Some(user) => user,
            None => {
                tracing::debug!(email = %command.email, "Login failed: unknown email");
                return Err(ApplicationError::invalid_credential(
                    "invalid email or password",
                ));
            }
        };

        let stored_hash = match user.password_hash.as_deref() {
            Some(hash) if !hash.is_empty() => hash,
            _ => {
                tracing::debug!(user_id = %user.id, "Login failed: account has no password");
                return Err(ApplicationError::invalid_credential("authentication failed"));
            }
        };

        let matched = verify_password(&command.password, stored_hash)
            .map_err(|e| ApplicationError::internal(e.to_string()))?;
        if !matched {
            tracing::debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(ApplicationError::invalid_credential(
                "invalid email or password",
            ));
        }

        let token = self
            .token_issuer
            .issue(&user.id)
            .map_err(|e| ApplicationError::signing(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in with password");

        Ok(LoginResponse {
            token,
            user_id: user.id,
            email: user.email,
            display_name: user.display_name,
        })
    }
}
