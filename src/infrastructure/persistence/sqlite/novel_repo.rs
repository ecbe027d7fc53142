//! SQLite Novel Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_db_error, DbPool};
use crate::application::ports::{
    NovelRecord, NovelRepositoryPort, NovelVisibility, RepositoryError,
};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const NOVEL_COLUMNS: &str = "id, title, logline, description, genre, visibility, owner_user_id, cover_image_url, created_at, updated_at";

#[derive(FromRow)]
struct NovelRow {
    id: String,
    title: String,
    logline: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    visibility: String,
    owner_user_id: String,
    cover_image_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        Ok(NovelRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            logline: row.logline,
            description: row.description,
            genre: row.genre,
            visibility: NovelVisibility::from_str(&row.visibility).unwrap_or_default(),
            owner_user_id: row.owner_user_id,
            cover_image_url: row.cover_image_url,
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
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn create(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, title, logline, description, genre, visibility, owner_user_id, cover_image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(novel.id.to_string())
        .bind(&novel.title)
        .bind(&novel.logline)
        .bind(&novel.description)
        .bind(&novel.genre)
        .bind(novel.visibility.as_str())
        .bind(&novel.owner_user_id)
        .bind(&novel.cover_image_url)
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> =
            sqlx::query_as(&format!("SELECT {NOVEL_COLUMNS} FROM novels WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {NOVEL_COLUMNS} FROM novels ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {NOVEL_COLUMNS} FROM novels WHERE owner_user_id = ? ORDER BY updated_at DESC"
        ))
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn update(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        // owner_user_id 和 created_at 创建后不可变更，不出现在 SET 列表中
        sqlx::query(
            r#"
            UPDATE novels
            SET title = ?, logline = ?, description = ?, genre = ?, visibility = ?, cover_image_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&novel.title)
        .bind(&novel.logline)
        .bind(&novel.description)
        .bind(&novel.genre)
        .bind(novel.visibility.as_str())
        .bind(&novel.cover_image_url)
        .bind(novel.updated_at.to_rfc3339())
        .bind(novel.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        // 使用事务确保原子性
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 chapter_revisions（通过 chapters）
        sqlx::query(
            "DELETE FROM chapter_revisions WHERE chapter_id IN (SELECT id FROM chapters WHERE novel_id = ?)"
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 chapters
        sqlx::query("DELETE FROM chapters WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 characters
        sqlx::query("DELETE FROM characters WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 places
        sqlx::query("DELETE FROM places WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除协作关系
        sqlx::query("DELETE FROM novel_collaborators WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除 novel
        sqlx::query("DELETE FROM novels WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn add_collaborator(
        &self,
        novel_id: Uuid,
        user_id: &str,
        role: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novel_collaborators (novel_id, user_id, role, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(novel_id, user_id) DO UPDATE SET
                role = excluded.role
            "#,
        )
        .bind(novel_id.to_string())
        .bind(user_id)
        .bind(role)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn remove_collaborator(
        &self,
        novel_id: Uuid,
        user_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM novel_collaborators WHERE novel_id = ? AND user_id = ?")
            .bind(novel_id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_collaborative(&self, user_id: &str) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(
            r#"
            SELECT n.id, n.title, n.logline, n.description, n.genre, n.visibility, n.owner_user_id, n.cover_image_url, n.created_at, n.updated_at
            FROM novels n
            INNER JOIN novel_collaborators c ON c.novel_id = n.id
            WHERE c.user_id = ?
            ORDER BY n.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn setup_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn sample_novel(owner: &str) -> NovelRecord {
        let now = Utc::now();
        NovelRecord {
            id: Uuid::new_v4(),
            title: "Dawn".to_string(),
            logline: Some("A city wakes".to_string()),
            description: None,
            genre: Some("sci-fi".to_string()),
            visibility: NovelVisibility::Private,
            owner_user_id: owner.to_string(),
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_roundtrip() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel("u1");
        repo.create(&novel).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Dawn");
        assert_eq!(found.logline.as_deref(), Some("A city wakes"));
        assert_eq!(found.visibility, NovelVisibility::Private);
        assert_eq!(found.owner_user_id, "u1");
    }

    #[tokio::test]
    async fn test_find_by_owner_filters() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool);

        repo.create(&sample_novel("u1")).await.unwrap();
        repo.create(&sample_novel("u1")).await.unwrap();
        repo.create(&sample_novel("u2")).await.unwrap();

        assert_eq!(repo.find_by_owner("u1").await.unwrap().len(), 2);
        assert_eq!(repo.find_by_owner("u2").await.unwrap().len(), 1);
        assert_eq!(repo.find_by_owner("u3").await.unwrap().len(), 0);
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_owner() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel("u1");
        repo.create(&novel).await.unwrap();

        let mut changed = novel.clone();
        changed.title = "Dusk".to_string();
        changed.owner_user_id = "intruder".to_string();
        changed.updated_at = Utc::now();
        repo.update(&changed).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Dusk");
        assert_eq!(found.owner_user_id, "u1");
    }

    #[tokio::test]
    async fn test_collaborators() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel("u1");
        repo.create(&novel).await.unwrap();

        repo.add_collaborator(novel.id, "u2", "editor").await.unwrap();
        // 重复添加只更新角色
        repo.add_collaborator(novel.id, "u2", "reviewer").await.unwrap();

        let shared = repo.find_collaborative("u2").await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, novel.id);

        repo.remove_collaborator(novel.id, "u2").await.unwrap();
        assert!(repo.find_collaborative("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_collaborator_missing_novel_is_fk_violation() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool);

        let err = repo
            .add_collaborator(Uuid::new_v4(), "u2", "editor")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_dependents() {
        let pool = setup_pool().await;
        let repo = SqliteNovelRepository::new(pool.clone());

        let novel = sample_novel("u1");
        repo.create(&novel).await.unwrap();
        repo.add_collaborator(novel.id, "u2", "editor").await.unwrap();

        repo.delete(novel.id).await.unwrap();

        assert!(repo.find_by_id(novel.id).await.unwrap().is_none());
        assert!(repo.find_collaborative("u2").await.unwrap().is_empty());
    }
}
