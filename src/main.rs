//! Scriven - 协作写作平台创作后端
//!
//! - Domain: 字数统计、章节排序规则
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, auth

use std::sync::Arc;

use scriven::config::{load_config, print_config};
use scriven::infrastructure::auth::{
    HttpIdentityVerifier, HttpIdentityVerifierConfig, SessionTokenIssuer,
};
// use scriven::infrastructure::auth::StaticIdentityVerifier;
use scriven::infrastructure::http::{AppState, HttpServer, ServerConfig};
use scriven::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    SqliteCharacterRepository, SqliteNovelRepository, SqlitePlaceRepository, SqliteUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},scriven={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Scriven - 协作写作平台创作后端");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
    let character_repo = Arc::new(SqliteCharacterRepository::new(pool.clone()));
    let place_repo = Arc::new(SqlitePlaceRepository::new(pool.clone()));

    // 创建 HTTP 身份校验客户端
    let identity_config = HttpIdentityVerifierConfig {
        base_url: config.identity.url.clone(),
        timeout_secs: config.identity.timeout_secs,
    };
    let identity_verifier = Arc::new(HttpIdentityVerifier::new(identity_config)?);

    // // 固定令牌表身份校验器（本地开发用，身份服务不可达时换用）
    // let identity_verifier = Arc::new(StaticIdentityVerifier::new().with_identity(
    //     "dev-token",
    //     "dev-user",
    //     Some("dev@example.com".to_string()),
    //     Some("Dev".to_string()),
    // ));

    // 创建会话令牌签发器
    let token_issuer = Arc::new(SessionTokenIssuer::new(
        config.auth.secret.clone(),
        config.auth.issuer.clone(),
        config.auth.token_ttl_minutes,
    ));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        user_repo,
        novel_repo,
        chapter_repo,
        character_repo,
        place_repo,
        identity_verifier,
        token_issuer,
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
