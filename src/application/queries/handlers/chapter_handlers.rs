//! Chapter Query Handlers - 章节与修订的读侧

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRepositoryPort, RevisionRecord,
};
use crate::application::queries::{GetChapter, ListChapters, ListRevisions};

// ============================================================================
// Response DTOs
// ============================================================================

/// 章节详情响应（含正文）
#[derive(Debug, Clone)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    pub order_index: i64,
    pub word_count: i64,
    pub last_edited_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<ChapterRecord> for ChapterResponse {
    fn from(record: ChapterRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            title: record.title,
            content: record.content,
            status: record.status.as_str().to_string(),
            order_index: record.order_index,
            word_count: record.word_count,
            last_edited_by: record.last_edited_by,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
            published_at: record.published_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// 修订详情响应
#[derive(Debug, Clone)]
pub struct RevisionResponse {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub content: String,
    pub authored_by: String,
    pub notes: String,
    pub created_at: String,
}

impl From<RevisionRecord> for RevisionResponse {
    fn from(record: RevisionRecord) -> Self {
        Self {
            id: record.id,
            chapter_id: record.chapter_id,
            content: record.content,
            authored_by: record.authored_by,
            notes: record.notes,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetChapter Handler
pub struct GetChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterResponse, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        Ok(ChapterResponse::from(chapter))
    }
}

/// ListChapters Handler
pub struct ListChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListChaptersHandler {
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
        query: ListChapters,
    ) -> Result<Vec<ChapterResponse>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let chapters = self.chapter_repo.list_by_novel(query.novel_id).await?;
        Ok(chapters.into_iter().map(ChapterResponse::from).collect())
    }
}

/// ListRevisions Handler
pub struct ListRevisionsHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListRevisionsHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(
        &self,
        query: ListRevisions,
    ) -> Result<Vec<RevisionResponse>, ApplicationError> {
        self.chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        let revisions = self
            .chapter_repo
            .find_revisions_by_chapter(query.chapter_id)
            .await?;
        Ok(revisions.into_iter().map(RevisionResponse::from).collect())
    }
}
