//! Novel Queries - 小说上下文读操作

use uuid::Uuid;

/// 获取小说详情查询
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub novel_id: Uuid,
}

/// 列出所有小说查询
#[derive(Debug, Clone)]
pub struct ListNovels;

/// 列出指定作者拥有的小说查询
#[derive(Debug, Clone)]
pub struct ListNovelsByOwner {
    pub owner_user_id: String,
}

/// 列出指定用户参与协作的小说查询
#[derive(Debug, Clone)]
pub struct ListCollaborativeNovels {
    pub user_id: String,
}

/// 列出小说角色查询
#[derive(Debug, Clone)]
pub struct ListCharacters {
    pub novel_id: Uuid,
}

/// 列出小说地点查询
#[derive(Debug, Clone)]
pub struct ListPlaces {
    pub novel_id: Uuid,
}
