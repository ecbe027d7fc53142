//! Novel Command Handlers - 小说创建、元数据维护与协作管理
//!
//! CreateNovelWithFirstChapter 是两步非原子写入，部分失败语义见
//! `ApplicationError::PartialFailure`。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{
    AddCollaborator, CreateCharacter, CreateNovel, CreateNovelWithFirstChapter, CreatePlace,
    DeleteNovel, RemoveCollaborator, UpdateNovel,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, CharacterRecord, CharacterRepositoryPort,
    NovelRecord, NovelRepositoryPort, NovelVisibility, PlaceRecord, PlaceRepositoryPort,
    RepositoryError,
};
use crate::domain::count_words;

/// 协作者缺省角色
const DEFAULT_COLLABORATOR_ROLE: &str = "editor";

// ============================================================================
// Responses
// ============================================================================

/// 创建小说响应
#[derive(Debug, Clone)]
pub struct CreateNovelResponse {
    pub id: Uuid,
    pub title: String,
    pub visibility: String,
    pub owner_user_id: String,
    pub created_at: String,
}

impl From<&NovelRecord> for CreateNovelResponse {
    fn from(record: &NovelRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            visibility: record.visibility.as_str().to_string(),
            owner_user_id: record.owner_user_id.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// 首章响应（嵌在小说创建响应里）
#[derive(Debug, Clone)]
pub struct FirstChapterResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub order_index: i64,
    pub word_count: i64,
}

/// 创建小说并附带第一章响应
#[derive(Debug, Clone)]
pub struct NovelWithFirstChapterResponse {
    pub novel: CreateNovelResponse,
    pub chapter: FirstChapterResponse,
}

/// 更新小说响应
#[derive(Debug, Clone)]
pub struct UpdateNovelResponse {
    pub id: Uuid,
    pub title: String,
    pub visibility: String,
    pub updated_at: String,
}

/// 创建角色响应
#[derive(Debug, Clone)]
pub struct CreateCharacterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub source: String,
}

/// 创建地点响应
#[derive(Debug, Clone)]
pub struct CreatePlaceResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub source: String,
}

// ============================================================================
// Validation
// ============================================================================

/// 校验创建/更新小说的公共字段，返回解析后的可见性
///
/// 一次性收集全部违规字段，任何存储调用之前执行。
fn validate_novel_fields(
    title: &str,
    visibility: &Option<String>,
    violations: &mut Vec<&'static str>,
) -> Option<NovelVisibility> {
    if title.trim().is_empty() {
        violations.push("title must not be empty");
    }

    match visibility.as_deref() {
        None | Some("") => None,
        Some(raw) => match NovelVisibility::from_str(raw) {
            Some(v) => Some(v),
            None => {
                violations.push("visibility must be one of private, invite_only, public");
                None
            }
        },
    }
}

fn validate_create_novel(command: &CreateNovel) -> Result<NovelVisibility, ApplicationError> {
    let mut violations = Vec::new();
    let visibility = validate_novel_fields(&command.title, &command.visibility, &mut violations);

    if command.owner_user_id.trim().is_empty() {
        violations.push("owner_user_id must not be empty");
    }

    if violations.is_empty() {
        Ok(visibility.unwrap_or_default())
    } else {
        Err(ApplicationError::validation(violations.join("; ")))
    }
}

fn build_novel_record(command: &CreateNovel, visibility: NovelVisibility) -> NovelRecord {
    let now = Utc::now();
    NovelRecord {
        id: Uuid::new_v4(),
        title: command.title.clone(),
        logline: command.logline.clone(),
        description: command.description.clone(),
        genre: command.genre.clone(),
        visibility,
        owner_user_id: command.owner_user_id.clone(),
        cover_image_url: command.cover_image_url.clone(),
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// CreateNovel
// ============================================================================

/// CreateNovel Handler
pub struct CreateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl CreateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        command: CreateNovel,
    ) -> Result<CreateNovelResponse, ApplicationError> {
        let visibility = validate_create_novel(&command)?;
        let novel = build_novel_record(&command, visibility);

        self.novel_repo.create(&novel).await?;

        tracing::info!(
            novel_id = %novel.id,
            title = %novel.title,
            owner = %novel.owner_user_id,
            "Novel created"
        );

        Ok(CreateNovelResponse::from(&novel))
    }
}

// ============================================================================
// CreateNovelWithFirstChapter
// ============================================================================

/// CreateNovelWithFirstChapter Handler
///
/// 小说落库后首章插入失败时返回 `PartialFailure`：
/// 小说已持久化，调用方只需补做章节一步。
pub struct CreateNovelWithFirstChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl CreateNovelWithFirstChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(
        &self,
        command: CreateNovelWithFirstChapter,
    ) -> Result<NovelWithFirstChapterResponse, ApplicationError> {
        // 两步的字段一起校验，避免小说落库后才发现章节字段非法
        let mut violations = Vec::new();
        let visibility =
            validate_novel_fields(&command.novel.title, &command.novel.visibility, &mut violations);
        if command.novel.owner_user_id.trim().is_empty() {
            violations.push("owner_user_id must not be empty");
        }
        if command.chapter_title.trim().is_empty() {
            violations.push("chapter_title must not be empty");
        }
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        let novel = build_novel_record(&command.novel, visibility.unwrap_or_default());
        self.novel_repo.create(&novel).await?;

        tracing::info!(
            novel_id = %novel.id,
            title = %novel.title,
            owner = %novel.owner_user_id,
            "Novel created"
        );

        let word_count = count_words(&command.initial_content) as i64;
        let now = Utc::now();
        let chapter = ChapterRecord {
            id: Uuid::new_v4(),
            novel_id: novel.id,
            title: command.chapter_title.clone(),
            content: command.initial_content.clone(),
            status: ChapterStatus::Draft,
            order_index: 0,
            word_count,
            last_edited_by: novel.owner_user_id.clone(),
            created_at: now,
            updated_at: now,
            published_at: None,
        };

        if let Err(e) = self.chapter_repo.create(&chapter).await {
            tracing::error!(
                novel_id = %novel.id,
                error = %e,
                "First chapter insert failed after novel create"
            );
            return Err(ApplicationError::partial_failure(
                "novel",
                "first_chapter",
                novel.id,
                e.to_string(),
            ));
        }

        tracing::info!(
            novel_id = %novel.id,
            chapter_id = %chapter.id,
            word_count,
            "Novel created with first chapter"
        );

        Ok(NovelWithFirstChapterResponse {
            novel: CreateNovelResponse::from(&novel),
            chapter: FirstChapterResponse {
                id: chapter.id,
                title: chapter.title,
                status: chapter.status.as_str().to_string(),
                order_index: chapter.order_index,
                word_count: chapter.word_count,
            },
        })
    }
}

// ============================================================================
// UpdateNovel
// ============================================================================

/// UpdateNovel Handler - 元数据整体替换，owner 与创建时间不动
pub struct UpdateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl UpdateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        command: UpdateNovel,
    ) -> Result<UpdateNovelResponse, ApplicationError> {
        let mut violations = Vec::new();
        let visibility = validate_novel_fields(&command.title, &command.visibility, &mut violations);
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        let existing = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let novel = NovelRecord {
            id: existing.id,
            title: command.title,
            logline: command.logline,
            description: command.description,
            genre: command.genre,
            // 未指定可见性时保持原值
            visibility: visibility.unwrap_or(existing.visibility),
            owner_user_id: existing.owner_user_id,
            cover_image_url: command.cover_image_url,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.novel_repo.update(&novel).await?;

        tracing::info!(novel_id = %novel.id, title = %novel.title, "Novel updated");

        Ok(UpdateNovelResponse {
            id: novel.id,
            title: novel.title,
            visibility: novel.visibility.as_str().to_string(),
            updated_at: novel.updated_at.to_rfc3339(),
        })
    }
}

// ============================================================================
// DeleteNovel
// ============================================================================

/// DeleteNovel Handler - 连带删除全部下属数据
pub struct DeleteNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl DeleteNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: DeleteNovel) -> Result<(), ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        self.novel_repo.delete(command.novel_id).await?;

        tracing::info!(
            novel_id = %command.novel_id,
            title = %novel.title,
            "Novel deleted"
        );

        Ok(())
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// AddCollaborator Handler - 重复添加按更新角色处理
pub struct AddCollaboratorHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl AddCollaboratorHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: AddCollaborator) -> Result<(), ApplicationError> {
        if command.user_id.trim().is_empty() {
            return Err(ApplicationError::validation("user_id must not be empty"));
        }

        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let role = command
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_COLLABORATOR_ROLE);

        self.novel_repo
            .add_collaborator(command.novel_id, &command.user_id, role)
            .await?;

        tracing::info!(
            novel_id = %command.novel_id,
            user_id = %command.user_id,
            role = %role,
            "Collaborator added"
        );

        Ok(())
    }
}

/// RemoveCollaborator Handler - 移除不存在的协作关系视为成功
pub struct RemoveCollaboratorHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl RemoveCollaboratorHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: RemoveCollaborator) -> Result<(), ApplicationError> {
        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        self.novel_repo
            .remove_collaborator(command.novel_id, &command.user_id)
            .await?;

        tracing::info!(
            novel_id = %command.novel_id,
            user_id = %command.user_id,
            "Collaborator removed"
        );

        Ok(())
    }
}

// ============================================================================
// CreateCharacter
// ============================================================================

/// CreateCharacter Handler - 人工创建的角色来源固定标记为 "user"
pub struct CreateCharacterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    character_repo: Arc<dyn CharacterRepositoryPort>,
}

impl CreateCharacterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        character_repo: Arc<dyn CharacterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            character_repo,
        }
    }

    pub async fn handle(
        &self,
        command: CreateCharacter,
    ) -> Result<CreateCharacterResponse, ApplicationError> {
        let mut violations = Vec::new();
        if command.name.trim().is_empty() {
            violations.push("name must not be empty");
        }
        if command.creator_user_id.trim().is_empty() {
            violations.push("creator_user_id must not be empty");
        }
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let now = Utc::now();
        let character = CharacterRecord {
            id: Uuid::new_v4(),
            novel_id: command.novel_id,
            name: command.name.clone(),
            description: command.description.clone(),
            backstory: command.backstory.clone(),
            motivations: command.motivations.clone(),
            physical_description: command.physical_description.clone(),
            image_url: command.image_url.clone(),
            source: "user".to_string(),
            created_by: command.creator_user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        match self.character_repo.create(&character).await {
            Ok(()) => {}
            // 存在性检查与插入之间小说被删，按缺失上报
            Err(RepositoryError::ForeignKeyViolation(_)) => {
                return Err(ApplicationError::not_found("Novel", command.novel_id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            character_id = %character.id,
            novel_id = %command.novel_id,
            name = %character.name,
            "Character created"
        );

        Ok(CreateCharacterResponse {
            id: character.id,
            novel_id: character.novel_id,
            name: character.name,
            source: character.source,
        })
    }
}

// ============================================================================
// CreatePlace
// ============================================================================

/// CreatePlace Handler - 与角色同构的小说附属实体
pub struct CreatePlaceHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    place_repo: Arc<dyn PlaceRepositoryPort>,
}

impl CreatePlaceHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        place_repo: Arc<dyn PlaceRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            place_repo,
        }
    }

    pub async fn handle(
        &self,
        command: CreatePlace,
    ) -> Result<CreatePlaceResponse, ApplicationError> {
        let mut violations = Vec::new();
        if command.name.trim().is_empty() {
            violations.push("name must not be empty");
        }
        if command.creator_user_id.trim().is_empty() {
            violations.push("creator_user_id must not be empty");
        }
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let now = Utc::now();
        let place = PlaceRecord {
            id: Uuid::new_v4(),
            novel_id: command.novel_id,
            name: command.name.clone(),
            description: command.description.clone(),
            location_details: command.location_details.clone(),
            atmosphere: command.atmosphere.clone(),
            image_url: command.image_url.clone(),
            source: "user".to_string(),
            created_by: command.creator_user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        match self.place_repo.create(&place).await {
            Ok(()) => {}
            Err(RepositoryError::ForeignKeyViolation(_)) => {
                return Err(ApplicationError::not_found("Novel", command.novel_id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            place_id = %place.id,
            novel_id = %command.novel_id,
            name = %place.name,
            "Place created"
        );

        Ok(CreatePlaceResponse {
            id: place.id,
            novel_id: place.novel_id,
            name: place.name,
            source: place.source,
        })
    }
}
