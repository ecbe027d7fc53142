//! SQLite Database - 数据库连接和迁移

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::application::ports::RepositoryError;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/scriven.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 将 sqlx 错误翻译为仓储错误
///
/// 唯一约束与外键约束必须区分开，上层按不同语义处理。
pub(crate) fn map_db_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::ForeignKeyViolation(db.message().to_string())
        }
        _ => RepositoryError::DatabaseError(e.to_string()),
    }
}

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    // foreign_keys 必须在每个连接上开启，SQLite 默认不强制外键
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("SQLite pool created with WAL mode, foreign_keys=ON, busy_timeout=5000ms");

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 users 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            external_uid TEXT UNIQUE,
            email TEXT NOT NULL,
            display_name TEXT NOT NULL,
            password_hash TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 邮箱唯一，但令牌登录账号可能没有邮箱（空串不参与约束）
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
        ON users(email) WHERE email != ''
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 novels 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novels (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            logline TEXT,
            description TEXT,
            genre TEXT,
            visibility TEXT NOT NULL DEFAULT 'private',
            owner_user_id TEXT NOT NULL,
            cover_image_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 chapters 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'draft',
            order_index INTEGER NOT NULL,
            word_count INTEGER NOT NULL DEFAULT 0,
            last_edited_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            published_at TEXT,
            FOREIGN KEY (novel_id) REFERENCES novels(id),
            UNIQUE (novel_id, order_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 chapter_revisions 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chapter_revisions (
            id TEXT PRIMARY KEY,
            chapter_id TEXT NOT NULL,
            content TEXT NOT NULL,
            authored_by TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            FOREIGN KEY (chapter_id) REFERENCES chapters(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 characters 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            backstory TEXT,
            motivations TEXT,
            physical_description TEXT,
            image_url TEXT,
            source TEXT NOT NULL DEFAULT 'user',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (novel_id) REFERENCES novels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 places 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS places (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            location_details TEXT,
            atmosphere TEXT,
            image_url TEXT,
            source TEXT NOT NULL DEFAULT 'user',
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (novel_id) REFERENCES novels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 novel_collaborators 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novel_collaborators (
            novel_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'editor',
            created_at TEXT NOT NULL,
            PRIMARY KEY (novel_id, user_id),
            FOREIGN KEY (novel_id) REFERENCES novels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapters_novel_id
        ON chapters(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapter_revisions_chapter_id
        ON chapter_revisions(chapter_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_novels_owner
        ON novels(owner_user_id)
        "#,
    )
    .execute(pool)
    .await?;

    // 索引: characters.novel_id / places.novel_id (用于按小说列出)
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_characters_novel_id
        ON characters(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_places_novel_id
        ON places(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_collaborators_user_id
        ON novel_collaborators(user_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}
