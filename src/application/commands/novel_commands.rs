//! Novel Commands - 小说上下文写操作

use uuid::Uuid;

/// 创建小说命令
///
/// `visibility` 为原始字符串，由处理器统一校验；缺省按 private 处理。
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner_user_id: String,
}

/// 创建小说并附带第一章命令
///
/// 两步非原子写入：小说落库成功而章节失败时返回
/// `PartialFailure`，调用方只需补做章节一步。
#[derive(Debug, Clone)]
pub struct CreateNovelWithFirstChapter {
    pub novel: CreateNovel,
    pub chapter_title: String,
    pub initial_content: String,
}

/// 更新小说元数据命令（owner_user_id 不可变更）
#[derive(Debug, Clone)]
pub struct UpdateNovel {
    pub novel_id: Uuid,
    pub title: String,
    pub logline: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub visibility: Option<String>,
    pub cover_image_url: Option<String>,
}

/// 删除小说命令（连带删除章节、修订、角色、地点、协作关系）
#[derive(Debug, Clone)]
pub struct DeleteNovel {
    pub novel_id: Uuid,
}

/// 添加协作者命令
#[derive(Debug, Clone)]
pub struct AddCollaborator {
    pub novel_id: Uuid,
    pub user_id: String,
    pub role: Option<String>,
}

/// 移除协作者命令
#[derive(Debug, Clone)]
pub struct RemoveCollaborator {
    pub novel_id: Uuid,
    pub user_id: String,
}

/// 创建角色命令
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub backstory: Option<String>,
    pub motivations: Option<String>,
    pub physical_description: Option<String>,
    pub image_url: Option<String>,
    pub creator_user_id: String,
}

/// 创建地点命令
#[derive(Debug, Clone)]
pub struct CreatePlace {
    pub novel_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_details: Option<String>,
    pub atmosphere: Option<String>,
    pub image_url: Option<String>,
    pub creator_user_id: String,
}
