//! SQLite Persistence - SQLite 数据库持久化实现

mod chapter_repo;
mod character_repo;
mod database;
mod novel_repo;
mod place_repo;
mod user_repo;

pub use chapter_repo::*;
pub use character_repo::*;
pub use database::*;
pub use novel_repo::*;
pub use place_repo::*;
pub use user_repo::*;
