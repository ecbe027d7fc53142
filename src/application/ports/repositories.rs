//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Constraint conflict: {0}")]
    Conflict(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// 用户实体（用于持久化）
///
/// `external_uid` 为外部身份提供方的主体标识，口令登录账号可以没有；
/// `password_hash` 只存散列值，令牌登录账号为 None。
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub external_uid: Option<String>,
    pub email: String,
    pub display_name: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 保存用户
    async fn create(&self, user: &UserRecord) -> Result<(), RepositoryError>;

    /// 根据外部主体标识查找用户
    async fn find_by_external_uid(&self, uid: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovelVisibility {
    /// 仅作者可见
    Private,
    /// 受邀协作者可见
    InviteOnly,
    /// 公开
    Public,
}

impl NovelVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            NovelVisibility::Private => "private",
            NovelVisibility::InviteOnly => "invite_only",
            NovelVisibility::Public => "public",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "private" => Some(NovelVisibility::Private),
            "invite_only" => Some(NovelVisibility::InviteOnly),
            "public" => Some(NovelVisibility::Public),
            _ => None,
        }
    }
}

impl Default for NovelVisibility {
    fn default() -> Self {
        NovelVisibility::Private
    }
}

/// 小说实体（用于持久化）
///
/// `owner_user_id` 创建后不可变更，update 实现不得写该列。
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: Uuid,
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: NovelVisibility,
    pub owner_user_id: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说
    async fn create(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 获取所有小说（按更新时间倒序）
    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 获取指定作者拥有的小说
    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 更新小说元数据（不含 owner_user_id）
    async fn update(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 删除小说及其全部下属数据（章节、修订、角色、地点、协作关系）
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 添加协作者（重复添加视为更新角色）
    async fn add_collaborator(
        &self,
        novel_id: Uuid,
        user_id: &str,
        role: &str,
    ) -> Result<(), RepositoryError>;

    /// 移除协作者
    async fn remove_collaborator(&self, novel_id: Uuid, user_id: &str)
        -> Result<(), RepositoryError>;

    /// 获取指定用户作为协作者参与的小说
    async fn find_collaborative(&self, user_id: &str) -> Result<Vec<NovelRecord>, RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    /// 草稿
    Draft,
    /// 已发布
    Published,
    /// 已归档
    Archived,
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::Draft => "draft",
            ChapterStatus::Published => "published",
            ChapterStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChapterStatus::Draft),
            "published" => Some(ChapterStatus::Published),
            "archived" => Some(ChapterStatus::Archived),
            _ => None,
        }
    }
}

impl Default for ChapterStatus {
    fn default() -> Self {
        ChapterStatus::Draft
    }
}

/// 章节实体（用于持久化）
///
/// `order_index` 在同一小说内唯一；`word_count` 为冗余存储的派生值，
/// 必须与 `content` 在同一条写入语句中落库。
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: ChapterStatus,
    pub order_index: i64,
    pub word_count: i64,
    pub last_edited_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// 修订实体（append-only，写入后不可变）
#[derive(Debug, Clone)]
pub struct RevisionRecord {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub content: String,
    pub authored_by: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Chapter Repository Port
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 保存章节
    ///
    /// (novel_id, order_index) 撞上唯一约束时返回 `Conflict`，
    /// novel_id 不存在时返回 `ForeignKeyViolation`。
    async fn create(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找章节
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 获取小说的所有章节（按序号升序）
    async fn list_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;

    /// 覆写正文、字数与最后编辑者（单条语句，三者同步落库）
    ///
    /// 不触碰 status、order_index、published_at。目标不存在时返回 `NotFound`。
    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        word_count: i64,
        edited_by: &str,
    ) -> Result<(), RepositoryError>;

    /// 删除章节及其全部修订，目标不存在时返回 `NotFound`
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 追加一条修订
    async fn append_revision(&self, revision: &RevisionRecord) -> Result<(), RepositoryError>;

    /// 获取章节的全部修订（按创建时间升序）
    async fn find_revisions_by_chapter(
        &self,
        chapter_id: Uuid,
    ) -> Result<Vec<RevisionRecord>, RepositoryError>;
}

// ============================================================================
// Character Repository
// ============================================================================

/// 角色实体（用于持久化）
#[derive(Debug, Clone)]
pub struct CharacterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub backstory: Option<String>,
    pub motivations: Option<String>,
    pub physical_description: Option<String>,
    pub image_url: Option<String>,
    /// 来源标记，人工创建固定为 "user"
    pub source: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Character Repository Port
#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    /// 保存角色
    async fn create(&self, character: &CharacterRecord) -> Result<(), RepositoryError>;

    /// 获取小说的所有角色（按创建时间升序）
    async fn list_by_novel(&self, novel_id: Uuid)
        -> Result<Vec<CharacterRecord>, RepositoryError>;
}

// ============================================================================
// Place Repository
// ============================================================================

/// 地点实体（用于持久化）
#[derive(Debug, Clone)]
pub struct PlaceRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_details: Option<String>,
    pub atmosphere: Option<String>,
    pub image_url: Option<String>,
    /// 来源标记，人工创建固定为 "user"
    pub source: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Place Repository Port
#[async_trait]
pub trait PlaceRepositoryPort: Send + Sync {
    /// 保存地点
    async fn create(&self, place: &PlaceRecord) -> Result<(), RepositoryError>;

    /// 获取小说的所有地点（按创建时间升序）
    async fn list_by_novel(&self, novel_id: Uuid) -> Result<Vec<PlaceRecord>, RepositoryError>;
}
