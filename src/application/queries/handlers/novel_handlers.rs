//! Novel Query Handlers - 小说、角色与地点的读侧

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    CharacterRecord, CharacterRepositoryPort, NovelRecord, NovelRepositoryPort, PlaceRecord,
    PlaceRepositoryPort,
};
use crate::application::queries::{
    GetNovel, ListCharacters, ListCollaborativeNovels, ListNovels, ListNovelsByOwner, ListPlaces,
};

// ============================================================================
// Response DTOs
// ============================================================================

/// 小说详情响应
#[derive(Debug, Clone)]
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

impl From<NovelRecord> for NovelResponse {
    fn from(record: NovelRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            logline: record.logline,
            description: record.description,
            genre: record.genre,
            visibility: record.visibility.as_str().to_string(),
            owner_user_id: record.owner_user_id,
            cover_image_url: record.cover_image_url,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 角色详情响应
#[derive(Debug, Clone)]
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

impl From<CharacterRecord> for CharacterResponse {
    fn from(record: CharacterRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            name: record.name,
            description: record.description,
            backstory: record.backstory,
            motivations: record.motivations,
            physical_description: record.physical_description,
            image_url: record.image_url,
            source: record.source,
            created_by: record.created_by,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// 地点详情响应
#[derive(Debug, Clone)]
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

impl From<PlaceRecord> for PlaceResponse {
    fn from(record: PlaceRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            name: record.name,
            description: record.description,
            location_details: record.location_details,
            atmosphere: record.atmosphere,
            image_url: record.image_url,
            source: record.source,
            created_by: record.created_by,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelResponse, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        Ok(NovelResponse::from(novel))
    }
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, _query: ListNovels) -> Result<Vec<NovelResponse>, ApplicationError> {
        let novels = self.novel_repo.find_all().await?;
        Ok(novels.into_iter().map(NovelResponse::from).collect())
    }
}

/// ListNovelsByOwner Handler
pub struct ListNovelsByOwnerHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsByOwnerHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        query: ListNovelsByOwner,
    ) -> Result<Vec<NovelResponse>, ApplicationError> {
        if query.owner_user_id.trim().is_empty() {
            return Err(ApplicationError::validation(
                "owner_user_id must not be empty",
            ));
        }

        let novels = self.novel_repo.find_by_owner(&query.owner_user_id).await?;
        Ok(novels.into_iter().map(NovelResponse::from).collect())
    }
}

/// ListCollaborativeNovels Handler
pub struct ListCollaborativeNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListCollaborativeNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        query: ListCollaborativeNovels,
    ) -> Result<Vec<NovelResponse>, ApplicationError> {
        if query.user_id.trim().is_empty() {
            return Err(ApplicationError::validation("user_id must not be empty"));
        }

        let novels = self.novel_repo.find_collaborative(&query.user_id).await?;
        Ok(novels.into_iter().map(NovelResponse::from).collect())
    }
}

/// ListCharacters Handler
pub struct ListCharactersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    character_repo: Arc<dyn CharacterRepositoryPort>,
}

impl ListCharactersHandler {
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
        query: ListCharacters,
    ) -> Result<Vec<CharacterResponse>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let characters = self.character_repo.list_by_novel(query.novel_id).await?;
        Ok(characters.into_iter().map(CharacterResponse::from).collect())
    }
}

/// ListPlaces Handler
pub struct ListPlacesHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    place_repo: Arc<dyn PlaceRepositoryPort>,
}

impl ListPlacesHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        place_repo: Arc<dyn PlaceRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            place_repo,
        }
    }

    pub async fn handle(&self, query: ListPlaces) -> Result<Vec<PlaceResponse>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let places = self.place_repo.list_by_novel(query.novel_id).await?;
        Ok(places.into_iter().map(PlaceResponse::from).collect())
    }
}
