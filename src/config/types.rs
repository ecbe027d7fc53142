//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 外部身份校验服务配置
    #[serde(default)]
    pub identity: IdentityConfig,

    /// 会话令牌配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            identity: IdentityConfig::default(),
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 外部身份校验服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// 身份服务基础 URL
    #[serde(default = "default_identity_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_identity_timeout")]
    pub timeout_secs: u64,
}

fn default_identity_url() -> String {
    "http://localhost:9099".to_string()
}

fn default_identity_timeout() -> u64 {
    10
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: default_identity_url(),
            timeout_secs: default_identity_timeout(),
        }
    }
}

/// 会话令牌配置
///
/// `secret` 缺省为空串，签发时才报错，未配置登录的部署照常启动。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC 签名密钥
    #[serde(default)]
    pub secret: String,

    /// 会话令牌有效期（分钟）
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,

    /// 令牌签发方标识
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_token_ttl() -> u64 {
    10080 // 7 天
}

fn default_issuer() -> String {
    "scriven-backend".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            issuer: default_issuer(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/scriven.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
