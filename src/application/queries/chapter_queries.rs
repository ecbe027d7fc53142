//! Chapter Queries - 章节上下文读操作

use uuid::Uuid;

/// 获取章节详情查询（含正文）
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub chapter_id: Uuid,
}

/// 列出小说章节查询（按序号升序）
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub novel_id: Uuid,
}

/// 列出章节修订查询（按创建时间升序）
#[derive(Debug, Clone)]
pub struct ListRevisions {
    pub chapter_id: Uuid,
}
