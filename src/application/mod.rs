//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、IdentityVerifier 等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Auth commands
    LoginWithIdentityToken,
    LoginWithPassword,
    // Chapter commands
    AddChapter,
    AutosaveChapter,
    DeleteChapter,
    SaveChapterWithRevision,
    // Novel commands
    AddCollaborator,
    CreateCharacter,
    CreateNovel,
    CreateNovelWithFirstChapter,
    CreatePlace,
    DeleteNovel,
    RemoveCollaborator,
    UpdateNovel,
    // Handlers
    handlers::{
        AddChapterHandler, AddCollaboratorHandler, AutosaveChapterHandler, CreateCharacterHandler,
        CreateNovelHandler, CreateNovelWithFirstChapterHandler, CreatePlaceHandler,
        DeleteChapterHandler, DeleteNovelHandler, LoginResponse, LoginWithIdentityTokenHandler,
        LoginWithPasswordHandler, RemoveCollaboratorHandler, SaveChapterWithRevisionHandler,
        UpdateNovelHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Identity verifier
    IdentityError,
    IdentityVerifierPort,
    VerifiedIdentity,
    // Repositories
    ChapterRecord,
    ChapterRepositoryPort,
    ChapterStatus,
    CharacterRecord,
    CharacterRepositoryPort,
    NovelRecord,
    NovelRepositoryPort,
    NovelVisibility,
    PlaceRecord,
    PlaceRepositoryPort,
    RepositoryError,
    RevisionRecord,
    UserRecord,
    UserRepositoryPort,
};

pub use queries::{
    // Chapter queries
    GetChapter,
    ListChapters,
    ListRevisions,
    // Novel queries
    GetNovel,
    ListCharacters,
    ListCollaborativeNovels,
    ListNovels,
    ListNovelsByOwner,
    ListPlaces,
    // Handlers
    handlers::{
        ChapterResponse, GetChapterHandler, GetNovelHandler, ListChaptersHandler,
        ListCharactersHandler, ListCollaborativeNovelsHandler, ListNovelsByOwnerHandler,
        ListNovelsHandler, ListPlacesHandler, ListRevisionsHandler, NovelResponse,
        RevisionResponse,
    },
};
