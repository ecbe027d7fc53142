//! SQLite Character Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_db_error, DbPool};
use crate::application::ports::{CharacterRecord, CharacterRepositoryPort, RepositoryError};

/// SQLite Character Repository
pub struct SqliteCharacterRepository {
    pool: DbPool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CHARACTER_COLUMNS: &str = "id, novel_id, name, description, backstory, motivations, physical_description, image_url, source, created_by, created_at, updated_at";

#[derive(FromRow)]
struct CharacterRow {
    id: String,
    novel_id: String,
    name: String,
    description: Option<String>,
    backstory: Option<String>,
    motivations: Option<String>,
    physical_description: Option<String>,
    image_url: Option<String>,
    source: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CharacterRow> for CharacterRecord {
    type Error = RepositoryError;

    fn try_from(row: CharacterRow) -> Result<Self, Self::Error> {
        Ok(CharacterRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            novel_id: Uuid::parse_str(&row.novel_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            description: row.description,
            backstory: row.backstory,
            motivations: row.motivations,
            physical_description: row.physical_description,
            image_url: row.image_url,
            source: row.source,
            created_by: row.created_by,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn create(&self, character: &CharacterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO characters (id, novel_id, name, description, backstory, motivations, physical_description, image_url, source, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.novel_id.to_string())
        .bind(&character.name)
        .bind(&character.description)
        .bind(&character.backstory)
        .bind(&character.motivations)
        .bind(&character.physical_description)
        .bind(&character.image_url)
        .bind(&character.source)
        .bind(&character.created_by)
        .bind(character.created_at.to_rfc3339())
        .bind(character.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn list_by_novel(
        &self,
        novel_id: Uuid,
    ) -> Result<Vec<CharacterRecord>, RepositoryError> {
        let rows: Vec<CharacterRow> = sqlx::query_as(&format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE novel_id = ? ORDER BY created_at"
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(CharacterRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NovelRecord, NovelRepositoryPort, NovelVisibility};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository,
    };

    async fn setup_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_novel(pool: &DbPool) -> Uuid {
        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            title: "Dawn".to_string(),
            logline: None,
            description: None,
            genre: None,
            visibility: NovelVisibility::Private,
            owner_user_id: "u1".to_string(),
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        };
        SqliteNovelRepository::new(pool.clone())
            .create(&novel)
            .await
            .unwrap();
        novel.id
    }

    fn sample_character(novel_id: Uuid, name: &str) -> CharacterRecord {
        let now = Utc::now();
        CharacterRecord {
            id: Uuid::new_v4(),
            novel_id,
            name: name.to_string(),
            description: Some("protagonist".to_string()),
            backstory: None,
            motivations: None,
            physical_description: None,
            image_url: None,
            source: "user".to_string(),
            created_by: "u1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteCharacterRepository::new(pool);

        repo.create(&sample_character(novel_id, "Ada")).await.unwrap();
        repo.create(&sample_character(novel_id, "Brin")).await.unwrap();

        let characters = repo.list_by_novel(novel_id).await.unwrap();
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].source, "user");
    }

    #[tokio::test]
    async fn test_create_with_missing_novel_is_fk_violation() {
        let pool = setup_pool().await;
        let repo = SqliteCharacterRepository::new(pool);

        let err = repo
            .create(&sample_character(Uuid::new_v4(), "Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
