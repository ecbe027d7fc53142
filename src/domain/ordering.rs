//! 章节序号分配器
//!
//! 追加新章节时计算下一个序号：取现有序号最大值加一，
//! 空列表从 0 开始。删除章节留下的缺口不做重排，
//! 分配结果只保证严格递增，不保证连续。

/// 计算下一个章节序号
///
/// `existing` 为小说现有章节的序号集合，顺序不限。
pub fn next_order_index(existing: &[i64]) -> i64 {
    match existing.iter().max() {
        Some(max) => max + 1,
        None => 0,
    }
}
