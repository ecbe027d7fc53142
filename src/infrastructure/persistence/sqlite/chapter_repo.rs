//! SQLite Chapter Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_db_error, DbPool};
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, RepositoryError, RevisionRecord,
};

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CHAPTER_COLUMNS: &str = "id, novel_id, title, content, status, order_index, word_count, last_edited_by, created_at, updated_at, published_at";

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    title: String,
    content: String,
    status: String,
    order_index: i64,
    word_count: i64,
    last_edited_by: String,
    created_at: String,
    updated_at: String,
    published_at: Option<String>,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            novel_id: Uuid::parse_str(&row.novel_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            content: row.content,
            status: ChapterStatus::from_str(&row.status).unwrap_or_default(),
            order_index: row.order_index,
            word_count: row.word_count,
            last_edited_by: row.last_edited_by,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            published_at: row
                .published_at
                .map(|s| {
                    DateTime::parse_from_rfc3339(&s)
                        .map(|t| t.with_timezone(&Utc))
                        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
                })
                .transpose()?,
        })
    }
}

#[derive(FromRow)]
struct RevisionRow {
    id: String,
    chapter_id: String,
    content: String,
    authored_by: String,
    notes: String,
    created_at: String,
}

impl TryFrom<RevisionRow> for RevisionRecord {
    type Error = RepositoryError;

    fn try_from(row: RevisionRow) -> Result<Self, Self::Error> {
        Ok(RevisionRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            chapter_id: Uuid::parse_str(&row.chapter_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            content: row.content,
            authored_by: row.authored_by,
            notes: row.notes,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn create(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, novel_id, title, content, status, order_index, word_count, last_edited_by, created_at, updated_at, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.novel_id.to_string())
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(chapter.status.as_str())
        .bind(chapter.order_index)
        .bind(chapter.word_count)
        .bind(&chapter.last_edited_by)
        .bind(chapter.created_at.to_rfc3339())
        .bind(chapter.updated_at.to_rfc3339())
        .bind(chapter.published_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> =
            sqlx::query_as(&format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn list_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE novel_id = ? ORDER BY order_index"
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        word_count: i64,
        edited_by: &str,
    ) -> Result<(), RepositoryError> {
        // 正文、字数、编辑者必须在同一条语句里落库，
        // status / order_index / published_at 不在 SET 列表中
        let result = sqlx::query(
            r#"
            UPDATE chapters
            SET content = ?, word_count = ?, last_edited_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content)
        .bind(word_count)
        .bind(edited_by)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("chapter {id}")));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        // 使用事务确保章节与修订一起消失
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM chapter_revisions WHERE chapter_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("chapter {id}")));
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn append_revision(&self, revision: &RevisionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapter_revisions (id, chapter_id, content, authored_by, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(revision.id.to_string())
        .bind(revision.chapter_id.to_string())
        .bind(&revision.content)
        .bind(&revision.authored_by)
        .bind(&revision.notes)
        .bind(revision.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_revisions_by_chapter(
        &self,
        chapter_id: Uuid,
    ) -> Result<Vec<RevisionRecord>, RepositoryError> {
        let rows: Vec<RevisionRow> = sqlx::query_as(
            "SELECT id, chapter_id, content, authored_by, notes, created_at FROM chapter_revisions WHERE chapter_id = ? ORDER BY created_at",
        )
        .bind(chapter_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(RevisionRecord::try_from).collect()
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

    fn sample_chapter(novel_id: Uuid, order_index: i64) -> ChapterRecord {
        let now = Utc::now();
        ChapterRecord {
            id: Uuid::new_v4(),
            novel_id,
            title: format!("Chapter {order_index}"),
            content: "Hello world".to_string(),
            status: ChapterStatus::Draft,
            order_index,
            word_count: 2,
            last_edited_by: "u1".to_string(),
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_roundtrip() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let chapter = sample_chapter(novel_id, 0);
        repo.create(&chapter).await.unwrap();

        let found = repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(found.novel_id, novel_id);
        assert_eq!(found.content, "Hello world");
        assert_eq!(found.status, ChapterStatus::Draft);
        assert_eq!(found.order_index, 0);
        assert_eq!(found.word_count, 2);
        assert!(found.published_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_order_index_is_conflict() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        repo.create(&sample_chapter(novel_id, 0)).await.unwrap();
        let err = repo.create(&sample_chapter(novel_id, 0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_with_missing_novel_is_fk_violation() {
        let pool = setup_pool().await;
        let repo = SqliteChapterRepository::new(pool);

        let err = repo
            .create(&sample_chapter(Uuid::new_v4(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_update_content_overwrites_only_content_fields() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let chapter = sample_chapter(novel_id, 3);
        repo.create(&chapter).await.unwrap();

        repo.update_content(chapter.id, "one two three", 3, "u2")
            .await
            .unwrap();

        let found = repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(found.content, "one two three");
        assert_eq!(found.word_count, 3);
        assert_eq!(found.last_edited_by, "u2");
        assert_eq!(found.order_index, 3);
        assert_eq!(found.status, ChapterStatus::Draft);
        assert!(found.published_at.is_none());
        assert!(found.updated_at >= chapter.updated_at);
    }

    #[tokio::test]
    async fn test_update_content_missing_chapter_is_not_found() {
        let pool = setup_pool().await;
        let repo = SqliteChapterRepository::new(pool);

        let err = repo
            .update_content(Uuid::new_v4(), "text", 1, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_novel_ordered_by_index() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        repo.create(&sample_chapter(novel_id, 5)).await.unwrap();
        repo.create(&sample_chapter(novel_id, 0)).await.unwrap();
        repo.create(&sample_chapter(novel_id, 2)).await.unwrap();

        let chapters = repo.list_by_novel(novel_id).await.unwrap();
        let indices: Vec<i64> = chapters.iter().map(|c| c.order_index).collect();
        assert_eq!(indices, vec![0, 2, 5]);
    }

    #[tokio::test]
    async fn test_delete_removes_chapter_and_revisions() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let chapter = sample_chapter(novel_id, 0);
        repo.create(&chapter).await.unwrap();
        repo.append_revision(&RevisionRecord {
            id: Uuid::new_v4(),
            chapter_id: chapter.id,
            content: "Hello world".to_string(),
            authored_by: "u1".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.delete(chapter.id).await.unwrap();

        assert!(repo.find_by_id(chapter.id).await.unwrap().is_none());
        assert!(repo
            .find_revisions_by_chapter(chapter.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_chapter_is_not_found() {
        let pool = setup_pool().await;
        let repo = SqliteChapterRepository::new(pool);

        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_revisions_listed_in_creation_order() {
        let pool = setup_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let chapter = sample_chapter(novel_id, 0);
        repo.create(&chapter).await.unwrap();

        let base = Utc::now();
        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            repo.append_revision(&RevisionRecord {
                id: Uuid::new_v4(),
                chapter_id: chapter.id,
                content: text.to_string(),
                authored_by: "u1".to_string(),
                notes: format!("note {i}"),
                created_at: base + chrono::Duration::seconds(i as i64),
            })
            .await
            .unwrap();
        }

        let revisions = repo.find_revisions_by_chapter(chapter.id).await.unwrap();
        let contents: Vec<&str> = revisions.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_revision_for_missing_chapter_is_fk_violation() {
        let pool = setup_pool().await;
        let repo = SqliteChapterRepository::new(pool);

        let err = repo
            .append_revision(&RevisionRecord {
                id: Uuid::new_v4(),
                chapter_id: Uuid::new_v4(),
                content: "orphan".to_string(),
                authored_by: "u1".to_string(),
                notes: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
