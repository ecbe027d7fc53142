//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod identity;
mod repositories;

pub use identity::{IdentityError, IdentityVerifierPort, VerifiedIdentity};
pub use repositories::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, CharacterRecord, CharacterRepositoryPort,
    NovelRecord, NovelRepositoryPort, NovelVisibility, PlaceRecord, PlaceRepositoryPort,
    RepositoryError, RevisionRecord, UserRecord, UserRepositoryPort,
};
