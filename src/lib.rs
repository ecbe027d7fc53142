//! Scriven - 协作写作平台创作后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 字数统计与章节排序的纯函数规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（User/Novel/Chapter/Character/Place Repositories, IdentityVerifier）
//! - Commands: CQRS 命令处理器（小说、章节、登录）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 存储
//! - Auth: JWT 会话签发、口令散列、外部身份校验客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
