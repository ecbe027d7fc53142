//! Domain Layer - 领域层
//!
//! 写作平台的纯业务规则，无任何存储与传输依赖：
//! - word_count: 字数估算
//! - ordering: 章节序号分配

mod ordering;
mod word_count;

pub use ordering::next_order_index;
pub use word_count::count_words;
