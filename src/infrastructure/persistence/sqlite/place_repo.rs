//! SQLite Place Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_db_error, DbPool};
use crate::application::ports::{PlaceRecord, PlaceRepositoryPort, RepositoryError};

/// SQLite Place Repository
pub struct SqlitePlaceRepository {
    pool: DbPool,
}

impl SqlitePlaceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const PLACE_COLUMNS: &str = "id, novel_id, name, description, location_details, atmosphere, image_url, source, created_by, created_at, updated_at";

#[derive(FromRow)]
struct PlaceRow {
    id: String,
    novel_id: String,
    name: String,
    description: Option<String>,
    location_details: Option<String>,
    atmosphere: Option<String>,
    image_url: Option<String>,
    source: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PlaceRow> for PlaceRecord {
    type Error = RepositoryError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        Ok(PlaceRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            novel_id: Uuid::parse_str(&row.novel_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            description: row.description,
            location_details: row.location_details,
            atmosphere: row.atmosphere,
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
impl PlaceRepositoryPort for SqlitePlaceRepository {
    async fn create(&self, place: &PlaceRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO places (id, novel_id, name, description, location_details, atmosphere, image_url, source, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(place.id.to_string())
        .bind(place.novel_id.to_string())
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.location_details)
        .bind(&place.atmosphere)
        .bind(&place.image_url)
        .bind(&place.source)
        .bind(&place.created_by)
        .bind(place.created_at.to_rfc3339())
        .bind(place.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn list_by_novel(&self, novel_id: Uuid) -> Result<Vec<PlaceRecord>, RepositoryError> {
        let rows: Vec<PlaceRow> = sqlx::query_as(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE novel_id = ? ORDER BY created_at"
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(PlaceRecord::try_from).collect()
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

    #[tokio::test]
    async fn test_create_and_list() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqlitePlaceRepository::new(pool);

        let now = Utc::now();
        repo.create(&PlaceRecord {
            id: Uuid::new_v4(),
            novel_id,
            name: "Harbor".to_string(),
            description: None,
            location_details: Some("north shore".to_string()),
            atmosphere: Some("foggy".to_string()),
            image_url: None,
            source: "user".to_string(),
            created_by: "u1".to_string(),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

        let places = repo.list_by_novel(novel_id).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Harbor");
        assert_eq!(places[0].atmosphere.as_deref(), Some("foggy"));
    }

    #[tokio::test]
    async fn test_create_with_missing_novel_is_fk_violation() {
        let pool = setup_pool().await;
        let repo = SqlitePlaceRepository::new(pool);

        let now = Utc::now();
        let err = repo
            .create(&PlaceRecord {
                id: Uuid::new_v4(),
                novel_id: Uuid::new_v4(),
                name: "Nowhere".to_string(),
                description: None,
                location_details: None,
                atmosphere: None,
                image_url: None,
                source: "user".to_string(),
                created_by: "u1".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
