//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddChapterHandler, AddCollaboratorHandler, AutosaveChapterHandler, CreateCharacterHandler,
    CreateNovelHandler, CreateNovelWithFirstChapterHandler, CreatePlaceHandler,
    DeleteChapterHandler, DeleteNovelHandler, LoginWithIdentityTokenHandler,
    LoginWithPasswordHandler, RemoveCollaboratorHandler, SaveChapterWithRevisionHandler,
    UpdateNovelHandler,
    // Query handlers
    GetChapterHandler, GetNovelHandler, ListChaptersHandler, ListCharactersHandler,
    ListCollaborativeNovelsHandler, ListNovelsByOwnerHandler, ListNovelsHandler,
    ListPlacesHandler, ListRevisionsHandler,
    // Ports
    ChapterRepositoryPort, CharacterRepositoryPort, IdentityVerifierPort, NovelRepositoryPort,
    PlaceRepositoryPort, UserRepositoryPort,
};
use crate::infrastructure::auth::SessionTokenIssuer;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub character_repo: Arc<dyn CharacterRepositoryPort>,
    pub place_repo: Arc<dyn PlaceRepositoryPort>,
    pub identity_verifier: Arc<dyn IdentityVerifierPort>,
    pub token_issuer: Arc<SessionTokenIssuer>,

    // ========== Command Handlers ==========
    pub login_identity_handler: LoginWithIdentityTokenHandler,
    pub login_password_handler: LoginWithPasswordHandler,
    pub create_novel_handler: CreateNovelHandler,
    pub create_novel_with_chapter_handler: CreateNovelWithFirstChapterHandler,
    pub update_novel_handler: UpdateNovelHandler,
    pub delete_novel_handler: DeleteNovelHandler,
    pub add_collaborator_handler: AddCollaboratorHandler,
    pub remove_collaborator_handler: RemoveCollaboratorHandler,
    pub create_character_handler: CreateCharacterHandler,
    pub create_place_handler: CreatePlaceHandler,
    pub add_chapter_handler: AddChapterHandler,
    pub autosave_chapter_handler: AutosaveChapterHandler,
    pub save_chapter_handler: SaveChapterWithRevisionHandler,
    pub delete_chapter_handler: DeleteChapterHandler,

    // ========== Query Handlers ==========
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub list_novels_by_owner_handler: ListNovelsByOwnerHandler,
    pub list_collaborative_novels_handler: ListCollaborativeNovelsHandler,
    pub list_characters_handler: ListCharactersHandler,
    pub list_places_handler: ListPlacesHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub list_chapters_handler: ListChaptersHandler,
    pub list_revisions_handler: ListRevisionsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        character_repo: Arc<dyn CharacterRepositoryPort>,
        place_repo: Arc<dyn PlaceRepositoryPort>,
        identity_verifier: Arc<dyn IdentityVerifierPort>,
        token_issuer: Arc<SessionTokenIssuer>,
    ) -> Self {
        Self {
            // Ports
            user_repo: user_repo.clone(),
            novel_repo: novel_repo.clone(),
            chapter_repo: chapter_repo.clone(),
            character_repo: character_repo.clone(),
            place_repo: place_repo.clone(),
            identity_verifier: identity_verifier.clone(),
            token_issuer: token_issuer.clone(),

            // Command handlers
            login_identity_handler: LoginWithIdentityTokenHandler::new(
                identity_verifier.clone(),
                user_repo.clone(),
                token_issuer.clone(),
            ),
            login_password_handler: LoginWithPasswordHandler::new(
                user_repo.clone(),
                token_issuer.clone(),
            ),
            create_novel_handler: CreateNovelHandler::new(novel_repo.clone()),
            create_novel_with_chapter_handler: CreateNovelWithFirstChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            update_novel_handler: UpdateNovelHandler::new(novel_repo.clone()),
            delete_novel_handler: DeleteNovelHandler::new(novel_repo.clone()),
            add_collaborator_handler: AddCollaboratorHandler::new(novel_repo.clone()),
            remove_collaborator_handler: RemoveCollaboratorHandler::new(novel_repo.clone()),
            create_character_handler: CreateCharacterHandler::new(
                novel_repo.clone(),
                character_repo.clone(),
            ),
            create_place_handler: CreatePlaceHandler::new(novel_repo.clone(), place_repo.clone()),
            add_chapter_handler: AddChapterHandler::new(novel_repo.clone(), chapter_repo.clone()),
            autosave_chapter_handler: AutosaveChapterHandler::new(chapter_repo.clone()),
            save_chapter_handler: SaveChapterWithRevisionHandler::new(chapter_repo.clone()),
            delete_chapter_handler: DeleteChapterHandler::new(chapter_repo.clone()),

            // Query handlers
            get_novel_handler: GetNovelHandler::new(novel_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone()),
            list_novels_by_owner_handler: ListNovelsByOwnerHandler::new(novel_repo.clone()),
            list_collaborative_novels_handler: ListCollaborativeNovelsHandler::new(
                novel_repo.clone(),
            ),
            list_characters_handler: ListCharactersHandler::new(
                novel_repo.clone(),
                character_repo.clone(),
            ),
            list_places_handler: ListPlacesHandler::new(novel_repo.clone(), place_repo.clone()),
            get_chapter_handler: GetChapterHandler::new(chapter_repo.clone()),
            list_chapters_handler: ListChaptersHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            list_revisions_handler: ListRevisionsHandler::new(chapter_repo.clone()),
        }
    }
}
