//! Identity Verifier 实现
//!
//! 实现 IdentityVerifierPort trait：
//! - HttpIdentityVerifier: 调用外部身份校验服务
//! - StaticIdentityVerifier: 固定令牌表，用于本地开发与测试
//!
//! 外部校验 API:
//! POST {base_url}/api/identity/verify
//! Request: {"token": "..."}  (JSON)
//! Response: {"subject": "...", "email": "...", "display_name": "..."}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::application::ports::{IdentityError, IdentityVerifierPort, VerifiedIdentity};

/// 身份校验请求体 (JSON)
#[derive(Debug, Serialize)]
struct VerifyHttpRequest<'a> {
    token: &'a str,
}

/// 身份校验响应体 (JSON)
#[derive(Debug, Deserialize)]
struct VerifyHttpResponse {
    subject: String,
    email: Option<String>,
    display_name: Option<String>,
}

/// HTTP 身份校验客户端配置
#[derive(Debug, Clone)]
pub struct HttpIdentityVerifierConfig {
    /// 身份服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpIdentityVerifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9099".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpIdentityVerifierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 身份校验客户端
pub struct HttpIdentityVerifier {
    client: Client,
    config: HttpIdentityVerifierConfig,
}

impl HttpIdentityVerifier {
    pub fn new(config: HttpIdentityVerifierConfig) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn verify_url(&self) -> String {
        format!("{}/api/identity/verify", self.config.base_url)
    }
}

#[async_trait]
impl IdentityVerifierPort for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .post(&self.verify_url())
            .json(&VerifyHttpRequest { token })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IdentityError::Timeout
                } else if e.is_connect() {
                    IdentityError::NetworkError(format!(
                        "Cannot connect to identity service: {}",
                        e
                    ))
                } else {
                    IdentityError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            return Err(IdentityError::InvalidCredential(error_text));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(IdentityError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: VerifyHttpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        if body.subject.is_empty() {
            return Err(IdentityError::InvalidResponse(
                "identity service returned an empty subject".to_string(),
            ));
        }

        tracing::debug!(subject = %body.subject, "Identity token verified");

        Ok(VerifiedIdentity {
            subject: body.subject,
            email: body.email,
            display_name: body.display_name,
        })
    }
}

/// 固定令牌表身份校验器
///
/// 用于本地开发与测试：令牌到身份的映射在构造时给定，
/// 表外令牌一律视为无效凭证。
#[derive(Default)]
pub struct StaticIdentityVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个可通过校验的令牌
    pub fn with_identity(
        mut self,
        token: impl Into<String>,
        subject: impl Into<String>,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        self.identities.insert(
            token.into(),
            VerifiedIdentity {
                subject: subject.into(),
                email,
                display_name,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifierPort for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidCredential("unknown identity token".to_string()))
    }
}
