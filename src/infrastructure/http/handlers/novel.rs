//! Novel HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AddCollaborator, CreateCharacter, CreateNovel, CreateNovelWithFirstChapter, CreatePlace,
    DeleteNovel, GetNovel, ListCharacters, ListCollaborativeNovels, ListNovels, ListNovelsByOwner,
    ListPlaces, RemoveCollaborator, UpdateNovel,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNovelRequest {
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct NovelCreatedResponse {
    pub id: Uuid,
    pub title: String,
    pub visibility: String,
    pub owner_user_id: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNovelWithChapterRequest {
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner_user_id: String,
    pub chapter_title: String,
    #[serde(default)]
    pub initial_content: String,
}

#[derive(Debug, Serialize)]
pub struct FirstChapterCreatedResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub order_index: i64,
    pub word_count: i64,
}

#[derive(Debug, Serialize)]
pub struct NovelWithChapterResponse {
    pub novel: NovelCreatedResponse,
    pub chapter: FirstChapterCreatedResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNovelRequest {
    pub id: Uuid,
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: Option<String>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NovelUpdatedResponse {
    pub id: Uuid,
    pub title: String,
    pub visibility: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNovelRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GetNovelRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: Uuid,
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: String,
    pub owner_user_id: String,
    pub cover_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::application::NovelResponse> for NovelResponse {
    fn from(r: crate::application::NovelResponse) -> Self {
        Self {
            id: r.id,
            title: r.title,
            logline: r.logline,
            description: r.description,
            genre: r.genre,
            visibility: r.visibility,
            owner_user_id: r.owner_user_id,
            cover_image_url: r.cover_image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListNovelsByOwnerRequest {
    pub owner_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCollaborativeNovelsRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCollaboratorRequest {
    pub novel_id: Uuid,
    pub user_id: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCollaboratorRequest {
    pub novel_id: Uuid,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub backstory: Option<String>,
    pub motivations: Option<String>,
    pub physical_description: Option<String>,
    pub image_url: Option<String>,
    pub creator_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct CharacterCreatedResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCharactersRequest {
    pub novel_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub backstory: Option<String>,
    pub motivations: Option<String>,
    pub physical_description: Option<String>,
    pub image_url: Option<String>,
    pub source: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_details: Option<String>,
    pub atmosphere: Option<String>,
    pub image_url: Option<String>,
    pub creator_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceCreatedResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct ListPlacesRequest {
    pub novel_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_details: Option<String>,
    pub atmosphere: Option<String>,
    pub image_url: Option<String>,
    pub source: String,
    pub created_by: String,
    pub created_at: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 创建小说
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNovelRequest>,
) -> Result<Json<ApiResponse<NovelCreatedResponse>>, ApiError> {
    let command = CreateNovel {
        title: req.title,
        logline: req.logline,
        description: req.description,
        genre: req.genre,
        visibility: req.visibility,
        cover_image_url: req.cover_image_url,
        owner_user_id: req.owner_user_id,
    };

    let result = state.create_novel_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(NovelCreatedResponse {
        id: result.id,
        title: result.title,
        visibility: result.visibility,
        owner_user_id: result.owner_user_id,
        created_at: result.created_at,
    })))
}

/// 创建小说并附带第一章
///
/// 两步写入：小说成功而章节失败时返回 errno=207，
/// data 中携带已落库的 novel id，客户端只需补做章节。
pub async fn create_novel_with_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNovelWithChapterRequest>,
) -> Result<Json<ApiResponse<NovelWithChapterResponse>>, ApiError> {
    let command = CreateNovelWithFirstChapter {
        novel: CreateNovel {
            title: req.title,
            logline: req.logline,
            description: req.description,
            genre: req.genre,
            visibility: req.visibility,
            cover_image_url: req.cover_image_url,
            owner_user_id: req.owner_user_id,
        },
        chapter_title: req.chapter_title,
        initial_content: req.initial_content,
    };

    let result = state.create_novel_with_chapter_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(NovelWithChapterResponse {
        novel: NovelCreatedResponse {
            id: result.novel.id,
            title: result.novel.title,
            visibility: result.novel.visibility,
            owner_user_id: result.novel.owner_user_id,
            created_at: result.novel.created_at,
        },
        chapter: FirstChapterCreatedResponse {
            id: result.chapter.id,
            title: result.chapter.title,
            status: result.chapter.status,
            order_index: result.chapter.order_index,
            word_count: result.chapter.word_count,
        },
    })))
}

/// 更新小说元数据
pub async fn update_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateNovelRequest>,
) -> Result<Json<ApiResponse<NovelUpdatedResponse>>, ApiError> {
    let command = UpdateNovel {
        novel_id: req.id,
        title: req.title,
        logline: req.logline,
        description: req.description,
        genre: req.genre,
        visibility: req.visibility,
        cover_image_url: req.cover_image_url,
    };

    let result = state.update_novel_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(NovelUpdatedResponse {
        id: result.id,
        title: result.title,
        visibility: result.visibility,
        updated_at: result.updated_at,
    })))
}

/// 删除小说及其全部下属数据
pub async fn delete_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteNovelRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = DeleteNovel { novel_id: req.id };

    state.delete_novel_handler.handle(command).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 获取小说详情
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetNovelRequest>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let query = GetNovel { novel_id: req.id };

    let result = state.get_novel_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(NovelResponse::from(result))))
}

/// 获取小说列表
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NovelResponse>>>, ApiError> {
    let result = state.list_novels_handler.handle(ListNovels).await?;

    let responses: Vec<NovelResponse> = result.into_iter().map(NovelResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 列出指定作者拥有的小说
pub async fn list_novels_by_owner(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListNovelsByOwnerRequest>,
) -> Result<Json<ApiResponse<Vec<NovelResponse>>>, ApiError> {
    let query = ListNovelsByOwner {
        owner_user_id: req.owner_user_id,
    };

    let result = state.list_novels_by_owner_handler.handle(query).await?;

    let responses: Vec<NovelResponse> = result.into_iter().map(NovelResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 列出指定用户参与协作的小说
pub async fn list_collaborative_novels(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListCollaborativeNovelsRequest>,
) -> Result<Json<ApiResponse<Vec<NovelResponse>>>, ApiError> {
    let query = ListCollaborativeNovels {
        user_id: req.user_id,
    };

    let result = state
        .list_collaborative_novels_handler
        .handle(query)
        .await?;

    let responses: Vec<NovelResponse> = result.into_iter().map(NovelResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 添加协作者（重复添加按更新角色处理）
pub async fn add_collaborator(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = AddCollaborator {
        novel_id: req.novel_id,
        user_id: req.user_id,
        role: req.role,
    };

    state.add_collaborator_handler.handle(command).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 移除协作者
pub async fn remove_collaborator(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveCollaboratorRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = RemoveCollaborator {
        novel_id: req.novel_id,
        user_id: req.user_id,
    };

    state.remove_collaborator_handler.handle(command).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 创建角色
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterCreatedResponse>>, ApiError> {
    let command = CreateCharacter {
        novel_id: req.novel_id,
        name: req.name,
        description: req.description,
        backstory: req.backstory,
        motivations: req.motivations,
        physical_description: req.physical_description,
        image_url: req.image_url,
        creator_user_id: req.creator_user_id,
    };

    let result = state.create_character_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(CharacterCreatedResponse {
        id: result.id,
        novel_id: result.novel_id,
        name: result.name,
        source: result.source,
    })))
}

/// 列出小说角色
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListCharactersRequest>,
) -> Result<Json<ApiResponse<Vec<CharacterResponse>>>, ApiError> {
    let query = ListCharacters {
        novel_id: req.novel_id,
    };

    let result = state.list_characters_handler.handle(query).await?;

    let responses: Vec<CharacterResponse> = result
        .into_iter()
        .map(|c| CharacterResponse {
            id: c.id,
            novel_id: c.novel_id,
            name: c.name,
            description: c.description,
            backstory: c.backstory,
            motivations: c.motivations,
            physical_description: c.physical_description,
            image_url: c.image_url,
            source: c.source,
            created_by: c.created_by,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 创建地点
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlaceRequest>,
) -> Result<Json<ApiResponse<PlaceCreatedResponse>>, ApiError> {
    let command = CreatePlace {
        novel_id: req.novel_id,
        name: req.name,
        description: req.description,
        location_details: req.location_details,
        atmosphere: req.atmosphere,
        image_url: req.image_url,
        creator_user_id: req.creator_user_id,
    };

    let result = state.create_place_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(PlaceCreatedResponse {
        id: result.id,
        novel_id: result.novel_id,
        name: result.name,
        source: result.source,
    })))
}

/// 列出小说地点
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListPlacesRequest>,
) -> Result<Json<ApiResponse<Vec<PlaceResponse>>>, ApiError> {
    let query = ListPlaces {
        novel_id: req.novel_id,
    };

    let result = state.list_places_handler.handle(query).await?;

    let responses: Vec<PlaceResponse> = result
        .into_iter()
        .map(|p| PlaceResponse {
            id: p.id,
            novel_id: p.novel_id,
            name: p.name,
            description: p.description,
            location_details: p.location_details,
            atmosphere: p.atmosphere,
            image_url: p.image_url,
            source: p.source,
            created_by: p.created_by,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(responses)))
}
