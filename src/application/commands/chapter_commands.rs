//! Chapter Commands - 章节上下文写操作

use uuid::Uuid;

/// 追加章节命令
///
/// 序号由服务端按现有章节计算，状态强制为 draft，
/// 调用方提交的任何状态都会被忽略。
#[derive(Debug, Clone)]
pub struct AddChapter {
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
    pub editor_user_id: String,
}

/// 自动保存命令
///
/// 高频调用路径：只覆写正文、字数与最后编辑者，不产生修订。
#[derive(Debug, Clone)]
pub struct AutosaveChapter {
    pub chapter_id: Uuid,
    pub content: String,
    pub editor_user_id: String,
}

/// 带修订保存命令
///
/// 覆写章节正文并追加一条不可变修订快照。
#[derive(Debug, Clone)]
pub struct SaveChapterWithRevision {
    pub chapter_id: Uuid,
    pub content: String,
    pub editor_user_id: String,
    pub notes: String,
}

/// 删除章节命令（连带删除其修订，序号缺口不回填）
#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub chapter_id: Uuid,
}
