//! Chapter Command Handlers - 章节追加、自动保存与修订保存
//!
//! 序号分配采用"读-算-写 + 唯一约束 + 有限重试"：
//! 并发追加撞上 (novel_id, order_index) 唯一约束时重读重算，
//! 预算耗尽后上抛 `Conflict`。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{
    AddChapter, AutosaveChapter, DeleteChapter, SaveChapterWithRevision,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, NovelRepositoryPort, RepositoryError,
    RevisionRecord,
};
use crate::domain::{count_words, next_order_index};

/// 序号冲突的最大重试次数
const MAX_ORDER_CONFLICT_RETRIES: u32 = 3;

// ============================================================================
// Responses
// ============================================================================

/// 追加章节响应
#[derive(Debug, Clone)]
pub struct AddChapterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub status: String,
    pub order_index: i64,
    pub word_count: i64,
}

impl From<&ChapterRecord> for AddChapterResponse {
    fn from(record: &ChapterRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            title: record.title.clone(),
            status: record.status.as_str().to_string(),
            order_index: record.order_index,
            word_count: record.word_count,
        }
    }
}

/// 自动保存响应
#[derive(Debug, Clone)]
pub struct AutosaveChapterResponse {
    pub chapter_id: Uuid,
    pub word_count: i64,
}

/// 带修订保存响应
#[derive(Debug, Clone)]
pub struct SaveChapterWithRevisionResponse {
    pub chapter_id: Uuid,
    pub word_count: i64,
    pub revision_id: Uuid,
}

// ============================================================================
// AddChapter
// ============================================================================

/// AddChapter Handler
///
/// 状态强制为 draft，字数由服务端根据正文计算，
/// 调用方提交的状态与字数一律不信任。
pub struct AddChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl AddChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, command: AddChapter) -> Result<AddChapterResponse, ApplicationError> {
        let mut violations = Vec::new();
        if command.title.trim().is_empty() {
            violations.push("title must not be empty");
        }
        if command.editor_user_id.trim().is_empty() {
            violations.push("editor_user_id must not be empty");
        }
        if !violations.is_empty() {
            return Err(ApplicationError::validation(violations.join("; ")));
        }

        // 存在性检查与插入之间的窗口由章节表外键兜底
        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let word_count = count_words(&command.content) as i64;

        for attempt in 0..MAX_ORDER_CONFLICT_RETRIES {
            let chapters = self.chapter_repo.list_by_novel(command.novel_id).await?;
            let existing: Vec<i64> = chapters.iter().map(|c| c.order_index).collect();
            let order_index = next_order_index(&existing);

            let now = Utc::now();
            let chapter = ChapterRecord {
                id: Uuid::new_v4(),
                novel_id: command.novel_id,
                title: command.title.clone(),
                content: command.content.clone(),
                status: ChapterStatus::Draft,
                order_index,
                word_count,
                last_edited_by: command.editor_user_id.clone(),
                created_at: now,
                updated_at: now,
                published_at: None,
            };

            match self.chapter_repo.create(&chapter).await {
                Ok(()) => {
                    tracing::info!(
                        chapter_id = %chapter.id,
                        novel_id = %command.novel_id,
                        order_index,
                        word_count,
                        "Chapter added"
                    );
                    return Ok(AddChapterResponse::from(&chapter));
                }
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(
                        novel_id = %command.novel_id,
                        order_index,
                        attempt,
                        "Order index conflict, retrying"
                    );
                }
                Err(RepositoryError::ForeignKeyViolation(_)) => {
                    return Err(ApplicationError::not_found("Novel", command.novel_id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApplicationError::conflict(format!(
            "order index contention on novel {} persisted after {} attempts",
            command.novel_id, MAX_ORDER_CONFLICT_RETRIES
        )))
    }
}

// ============================================================================
// AutosaveChapter
// ============================================================================

/// AutosaveChapter Handler
///
/// 高频调用路径：单条语句覆写正文/字数/最后编辑者，
/// 不读旧值，不产生修订，不触碰状态与序号。
pub struct AutosaveChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl AutosaveChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(
        &self,
        command: AutosaveChapter,
    ) -> Result<AutosaveChapterResponse, ApplicationError> {
        if command.editor_user_id.trim().is_empty() {
            return Err(ApplicationError::validation(
                "editor_user_id must not be empty",
            ));
        }

        let word_count = count_words(&command.content) as i64;

        self.chapter_repo
            .update_content(
                command.chapter_id,
                &command.content,
                word_count,
                &command.editor_user_id,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => {
                    ApplicationError::not_found("Chapter", command.chapter_id)
                }
                other => other.into(),
            })?;

        tracing::debug!(
            chapter_id = %command.chapter_id,
            word_count,
            "Chapter autosaved"
        );

        Ok(AutosaveChapterResponse {
            chapter_id: command.chapter_id,
            word_count,
        })
    }
}

// ============================================================================
// SaveChapterWithRevision
// ============================================================================

/// SaveChapterWithRevision Handler
///
/// 先覆写章节正文，再追加修订快照。正文已落库而修订失败时
/// 返回 `PartialFailure`：重放整个操作是安全的（正文覆写幂等、
/// 修订为纯追加），但调用方应当知道正文已经持久化。
pub struct SaveChapterWithRevisionHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl SaveChapterWithRevisionHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(
        &self,
        command: SaveChapterWithRevision,
    ) -> Result<SaveChapterWithRevisionResponse, ApplicationError> {
        if command.editor_user_id.trim().is_empty() {
            return Err(ApplicationError::validation(
                "editor_user_id must not be empty",
            ));
        }

        let word_count = count_words(&command.content) as i64;

        self.chapter_repo
            .update_content(
                command.chapter_id,
                &command.content,
                word_count,
                &command.editor_user_id,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => {
                    ApplicationError::not_found("Chapter", command.chapter_id)
                }
                other => other.into(),
            })?;

        let revision = RevisionRecord {
            id: Uuid::new_v4(),
            chapter_id: command.chapter_id,
            content: command.content.clone(),
            authored_by: command.editor_user_id.clone(),
            notes: command.notes.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.chapter_repo.append_revision(&revision).await {
            tracing::error!(
                chapter_id = %command.chapter_id,
                error = %e,
                "Revision append failed after content update"
            );
            return Err(ApplicationError::partial_failure(
                "chapter_update",
                "revision_append",
                command.chapter_id,
                e.to_string(),
            ));
        }

        tracing::info!(
            chapter_id = %command.chapter_id,
            revision_id = %revision.id,
            word_count,
            "Chapter saved with revision"
        );

        Ok(SaveChapterWithRevisionResponse {
            chapter_id: command.chapter_id,
            word_count,
            revision_id: revision.id,
        })
    }
}

// ============================================================================
// DeleteChapter
// ============================================================================

/// DeleteChapter Handler - 连带删除修订，留下的序号缺口不回填
pub struct DeleteChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl DeleteChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, command: DeleteChapter) -> Result<(), ApplicationError> {
        self.chapter_repo
            .delete(command.chapter_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => {
                    ApplicationError::not_found("Chapter", command.chapter_id)
                }
                other => other.into(),
            })?;

        tracing::info!(chapter_id = %command.chapter_id, "Chapter deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::application::ports::NovelRecord;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, DbPool, SqliteChapterRepository,
        SqliteNovelRepository,
    };

    async fn setup() -> (DbPool, Arc<SqliteChapterRepository>, Uuid) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            title: "Dawn".to_string(),
            logline: None,
            description: None,
            genre: None,
            visibility: Default::default(),
            owner_user_id: "u1".to_string(),
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        };
        SqliteNovelRepository::new(pool.clone())
            .create(&novel)
            .await
            .unwrap();

        let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
        (pool, chapter_repo, novel.id)
    }

    fn novel_repo_for(pool: &DbPool) -> Arc<SqliteNovelRepository> {
        Arc::new(SqliteNovelRepository::new(pool.clone()))
    }

    fn add(novel_id: Uuid, title: &str, content: &str) -> AddChapter {
        AddChapter {
            novel_id,
            title: title.to_string(),
            content: content.to_string(),
            editor_user_id: "u1".to_string(),
        }
    }

    /// 前 N 次 create 返回 Conflict，之后委托真实仓储
    struct ConflictInjectingRepo {
        inner: Arc<SqliteChapterRepository>,
        remaining_conflicts: AtomicU32,
        create_calls: AtomicU32,
    }

    impl ConflictInjectingRepo {
        fn new(inner: Arc<SqliteChapterRepository>, conflicts: u32) -> Self {
            Self {
                inner,
                remaining_conflicts: AtomicU32::new(conflicts),
                create_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChapterRepositoryPort for ConflictInjectingRepo {
        async fn create(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.remaining_conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.remaining_conflicts.store(remaining - 1, Ordering::SeqCst);
                return Err(RepositoryError::Conflict("simulated duplicate".to_string()));
            }
            self.inner.create(chapter).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn list_by_novel(
            &self,
            novel_id: Uuid,
        ) -> Result<Vec<ChapterRecord>, RepositoryError> {
            self.inner.list_by_novel(novel_id).await
        }

        async fn update_content(
            &self,
            id: Uuid,
            content: &str,
            word_count: i64,
            edited_by: &str,
        ) -> Result<(), RepositoryError> {
            self.inner.update_content(id, content, word_count, edited_by).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }

        async fn append_revision(&self, revision: &RevisionRecord) -> Result<(), RepositoryError> {
            self.inner.append_revision(revision).await
        }

        async fn find_revisions_by_chapter(
            &self,
            chapter_id: Uuid,
        ) -> Result<Vec<RevisionRecord>, RepositoryError> {
            self.inner.find_revisions_by_chapter(chapter_id).await
        }
    }

    /// 正文覆写成功，修订追加注定失败
    struct FailingRevisionRepo {
        inner: Arc<SqliteChapterRepository>,
    }

    #[async_trait]
    impl ChapterRepositoryPort for FailingRevisionRepo {
        async fn create(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
            self.inner.create(chapter).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn list_by_novel(
            &self,
            novel_id: Uuid,
        ) -> Result<Vec<ChapterRecord>, RepositoryError> {
            self.inner.list_by_novel(novel_id).await
        }

        async fn update_content(
            &self,
            id: Uuid,
            content: &str,
            word_count: i64,
            edited_by: &str,
        ) -> Result<(), RepositoryError> {
            self.inner.update_content(id, content, word_count, edited_by).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }

        async fn append_revision(&self, _revision: &RevisionRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::DatabaseError("disk full".to_string()))
        }

        async fn find_revisions_by_chapter(
            &self,
            chapter_id: Uuid,
        ) -> Result<Vec<RevisionRecord>, RepositoryError> {
            self.inner.find_revisions_by_chapter(chapter_id).await
        }
    }

    #[tokio::test]
    async fn test_add_chapter_assigns_sequential_indexes() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo);

        let first = handler.handle(add(novel_id, "One", "Hello world")).await.unwrap();
        let second = handler
            .handle(add(novel_id, "Two", "word word word word word"))
            .await
            .unwrap();

        assert_eq!(first.order_index, 0);
        assert_eq!(first.word_count, 2);
        assert_eq!(first.status, "draft");
        assert_eq!(second.order_index, 1);
        assert_eq!(second.word_count, 5);
    }

    #[tokio::test]
    async fn test_add_chapter_preserves_gap_after_delete() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo.clone());
        let delete_handler = DeleteChapterHandler::new(chapter_repo.clone());

        handler.handle(add(novel_id, "One", "")).await.unwrap();
        let middle = handler.handle(add(novel_id, "Two", "")).await.unwrap();
        handler.handle(add(novel_id, "Three", "")).await.unwrap();

        delete_handler
            .handle(DeleteChapter { chapter_id: middle.id })
            .await
            .unwrap();

        // 缺口留在 1，新章节接在最大序号之后
        let fourth = handler.handle(add(novel_id, "Four", "")).await.unwrap();
        assert_eq!(fourth.order_index, 3);

        let indices: Vec<i64> = chapter_repo
            .list_by_novel(novel_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.order_index)
            .collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_chapter_missing_novel_is_not_found() {
        let (pool, chapter_repo, _) = setup().await;
        let handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo);

        let err = handler
            .handle(add(Uuid::new_v4(), "Orphan", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_chapter_collects_all_violations() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo);

        let mut command = add(novel_id, "  ", "");
        command.editor_user_id = String::new();
        let err = handler.handle(command).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("title must not be empty"));
        assert!(message.contains("editor_user_id must not be empty"));
    }

    #[tokio::test]
    async fn test_add_chapter_retries_once_on_conflict() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let injecting = Arc::new(ConflictInjectingRepo::new(chapter_repo.clone(), 1));
        let handler = AddChapterHandler::new(novel_repo_for(&pool), injecting.clone());

        let response = handler.handle(add(novel_id, "One", "")).await.unwrap();

        assert_eq!(response.order_index, 0);
        assert_eq!(injecting.create_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_add_chapter_gives_up_after_retry_budget() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let injecting = Arc::new(ConflictInjectingRepo::new(chapter_repo.clone(), u32::MAX));
        let handler = AddChapterHandler::new(novel_repo_for(&pool), injecting.clone());

        let err = handler.handle(add(novel_id, "One", "")).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Conflict(_)));
        assert_eq!(
            injecting.create_calls.load(Ordering::SeqCst),
            MAX_ORDER_CONFLICT_RETRIES
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_indexes() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo);

        let (left, right) = tokio::join!(
            handler.handle(add(novel_id, "Left", "")),
            handler.handle(add(novel_id, "Right", ""))
        );

        let mut indices = vec![left.unwrap().order_index, right.unwrap().order_index];
        indices.sort();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_autosave_overwrites_without_revision() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let add_handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo.clone());
        let handler = AutosaveChapterHandler::new(chapter_repo.clone());

        let chapter = add_handler.handle(add(novel_id, "One", "old text")).await.unwrap();

        let response = handler
            .handle(AutosaveChapter {
                chapter_id: chapter.id,
                content: "a b  c\tc\n".to_string(),
                editor_user_id: "u2".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.word_count, 4);

        let stored = chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "a b  c\tc\n");
        assert_eq!(stored.word_count, 4);
        assert_eq!(stored.last_edited_by, "u2");
        assert!(chapter_repo
            .find_revisions_by_chapter(chapter.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_autosave_missing_chapter_is_not_found() {
        let (_pool, chapter_repo, _) = setup().await;
        let handler = AutosaveChapterHandler::new(chapter_repo);

        let err = handler
            .handle(AutosaveChapter {
                chapter_id: Uuid::new_v4(),
                content: "text".to_string(),
                editor_user_id: "u1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_with_revision_appends_snapshot() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let add_handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo.clone());
        let handler = SaveChapterWithRevisionHandler::new(chapter_repo.clone());

        let chapter = add_handler.handle(add(novel_id, "One", "draft")).await.unwrap();

        let content = "one two three four five six seven eight nine ten";
        let response = handler
            .handle(SaveChapterWithRevision {
                chapter_id: chapter.id,
                content: content.to_string(),
                editor_user_id: "u1".to_string(),
                notes: "rewrite".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.word_count, 10);

        let revisions = chapter_repo
            .find_revisions_by_chapter(chapter.id)
            .await
            .unwrap();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].id, response.revision_id);
        assert_eq!(revisions[0].content, content);
        assert_eq!(revisions[0].notes, "rewrite");

        let stored = chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.content, content);
        assert_eq!(stored.word_count, 10);
    }

    #[tokio::test]
    async fn test_save_with_revision_reports_partial_failure() {
        let (pool, chapter_repo, novel_id) = setup().await;
        let add_handler = AddChapterHandler::new(novel_repo_for(&pool), chapter_repo.clone());
        let failing = Arc::new(FailingRevisionRepo {
            inner: chapter_repo.clone(),
        });
        let handler = SaveChapterWithRevisionHandler::new(failing);

        let chapter = add_handler.handle(add(novel_id, "One", "draft")).await.unwrap();

        let err = handler
            .handle(SaveChapterWithRevision {
                chapter_id: chapter.id,
                content: "new text".to_string(),
                editor_user_id: "u1".to_string(),
                notes: String::new(),
            })
            .await
            .unwrap_err();

        match err {
            ApplicationError::PartialFailure {
                persisted_step,
                failed_step,
                persisted_id,
                ..
            } => {
                assert_eq!(persisted_step, "chapter_update");
                assert_eq!(failed_step, "revision_append");
                assert_eq!(persisted_id, chapter.id);
            }
            other => panic!("expected PartialFailure, got {other:?}"),
        }

        // 正文已落库，修订缺失
        let stored = chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "new text");
        assert!(chapter_repo
            .find_revisions_by_chapter(chapter.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_chapter_is_not_found() {
        let (_pool, chapter_repo, _) = setup().await;
        let handler = DeleteChapterHandler::new(chapter_repo);

        let err = handler
            .handle(DeleteChapter {
                chapter_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }
}
