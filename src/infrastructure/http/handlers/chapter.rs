//! Chapter HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AddChapter, AutosaveChapter, DeleteChapter, GetChapter, ListChapters, ListRevisions,
    SaveChapterWithRevision,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddChapterRequest {
    pub novel_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub editor_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterAddedResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub status: String,
    pub order_index: i64,
    pub word_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct GetChapterRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
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

impl From<crate::application::ChapterResponse> for ChapterResponse {
    fn from(r: crate::application::ChapterResponse) -> Self {
        Self {
            id: r.id,
            novel_id: r.novel_id,
            title: r.title,
            content: r.content,
            status: r.status,
            order_index: r.order_index,
            word_count: r.word_count,
            last_edited_by: r.last_edited_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
            published_at: r.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListChaptersRequest {
    pub novel_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AutosaveChapterRequest {
    pub chapter_id: Uuid,
    #[serde(default)]
    pub content: String,
    pub editor_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct AutosaveChapterResponse {
    pub chapter_id: Uuid,
    pub word_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct SaveChapterRequest {
    pub chapter_id: Uuid,
    #[serde(default)]
    pub content: String,
    pub editor_user_id: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterSavedResponse {
    pub chapter_id: Uuid,
    pub word_count: i64,
    pub revision_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChapterRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListRevisionsRequest {
    pub chapter_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RevisionResponse {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub content: String,
    pub authored_by: String,
    pub notes: String,
    pub created_at: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 追加章节，序号由服务端按现有章节计算
pub async fn add_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddChapterRequest>,
) -> Result<Json<ApiResponse<ChapterAddedResponse>>, ApiError> {
    let command = AddChapter {
        novel_id: req.novel_id,
        title: req.title,
        content: req.content,
        editor_user_id: req.editor_user_id,
    };

    let result = state.add_chapter_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(ChapterAddedResponse {
        id: result.id,
        novel_id: result.novel_id,
        title: result.title,
        status: result.status,
        order_index: result.order_index,
        word_count: result.word_count,
    })))
}

/// 获取章节详情（含正文）
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetChapterRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let query = GetChapter { chapter_id: req.id };

    let result = state.get_chapter_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(ChapterResponse::from(result))))
}

/// 列出小说章节（按序号升序）
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListChaptersRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let query = ListChapters {
        novel_id: req.novel_id,
    };

    let result = state.list_chapters_handler.handle(query).await?;

    let responses: Vec<ChapterResponse> = result.into_iter().map(ChapterResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 自动保存，不产生修订
pub async fn autosave_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AutosaveChapterRequest>,
) -> Result<Json<ApiResponse<AutosaveChapterResponse>>, ApiError> {
    let command = AutosaveChapter {
        chapter_id: req.chapter_id,
        content: req.content,
        editor_user_id: req.editor_user_id,
    };

    let result = state.autosave_chapter_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(AutosaveChapterResponse {
        chapter_id: result.chapter_id,
        word_count: result.word_count,
    })))
}

/// 保存并追加一条修订
///
/// 章节已更新而修订写入失败时返回 errno=207，
/// 客户端可在不丢正文的前提下重试修订。
pub async fn save_chapter_with_revision(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveChapterRequest>,
) -> Result<Json<ApiResponse<ChapterSavedResponse>>, ApiError> {
    let command = SaveChapterWithRevision {
        chapter_id: req.chapter_id,
        content: req.content,
        editor_user_id: req.editor_user_id,
        notes: req.notes,
    };

    let result = state.save_chapter_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(ChapterSavedResponse {
        chapter_id: result.chapter_id,
        word_count: result.word_count,
        revision_id: result.revision_id,
    })))
}

/// 删除章节，序号缺口不回填
pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteChapterRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = DeleteChapter { chapter_id: req.id };

    state.delete_chapter_handler.handle(command).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 列出章节修订（按创建时间升序）
pub async fn list_revisions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListRevisionsRequest>,
) -> Result<Json<ApiResponse<Vec<RevisionResponse>>>, ApiError> {
    let query = ListRevisions {
        chapter_id: req.chapter_id,
    };

    let result = state.list_revisions_handler.handle(query).await?;

    let responses: Vec<RevisionResponse> = result
        .into_iter()
        .map(|r| RevisionResponse {
            id: r.id,
            chapter_id: r.chapter_id,
            content: r.content,
            authored_by: r.authored_by,
            notes: r.notes,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(responses)))
}
