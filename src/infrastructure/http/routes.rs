//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping                        GET   健康检查
//! - /api/auth/login                  POST  外部身份令牌登录（首登建档）
//! - /api/auth/login_password         POST  邮箱口令登录
//! - /api/novel/create                POST  创建小说
//! - /api/novel/create_with_chapter   POST  创建小说并附带第一章
//! - /api/novel/update                POST  更新小说元数据
//! - /api/novel/delete                POST  删除小说（连带下属数据）
//! - /api/novel/get                   POST  获取小说详情
//! - /api/novel/list                  GET   列出所有小说
//! - /api/novel/list_by_owner         POST  列出指定作者的小说
//! - /api/novel/list_collaborative    POST  列出参与协作的小说
//! - /api/novel/collaborator/add      POST  添加协作者
//! - /api/novel/collaborator/remove   POST  移除协作者
//! - /api/novel/character/create      POST  创建角色
//! - /api/novel/character/list        POST  列出角色
//! - /api/novel/place/create          POST  创建地点
//! - /api/novel/place/list            POST  列出地点
//! - /api/chapter/add                 POST  追加章节（服务端定序号）
//! - /api/chapter/get                 POST  获取章节详情（含正文）
//! - /api/chapter/list                POST  列出小说章节
//! - /api/chapter/autosave            POST  自动保存（不产生修订）
//! - /api/chapter/save                POST  保存并追加修订
//! - /api/chapter/delete              POST  删除章节
//! - /api/chapter/revisions           POST  列出章节修订

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/auth", auth_routes())
        .nest("/novel", novel_routes())
        .nest("/chapter", chapter_routes())
}

/// Auth 路由
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(handlers::login_with_identity_token))
        .route("/login_password", post(handlers::login_with_password))
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_novel))
        .route("/create_with_chapter", post(handlers::create_novel_with_chapter))
        .route("/update", post(handlers::update_novel))
        .route("/delete", post(handlers::delete_novel))
        .route("/get", post(handlers::get_novel))
        .route("/list", get(handlers::list_novels))
        .route("/list_by_owner", post(handlers::list_novels_by_owner))
        .route("/list_collaborative", post(handlers::list_collaborative_novels))
        .route("/collaborator/add", post(handlers::add_collaborator))
        .route("/collaborator/remove", post(handlers::remove_collaborator))
        .route("/character/create", post(handlers::create_character))
        .route("/character/list", post(handlers::list_characters))
        .route("/place/create", post(handlers::create_place))
        .route("/place/list", post(handlers::list_places))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/add", post(handlers::add_chapter))
        .route("/get", post(handlers::get_chapter))
        .route("/list", post(handlers::list_chapters))
        .route("/autosave", post(handlers::autosave_chapter))
        .route("/save", post(handlers::save_chapter_with_revision))
        .route("/delete", post(handlers::delete_chapter))
        .route("/revisions", post(handlers::list_revisions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request as HttpRequest, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    use crate::infrastructure::auth::{SessionTokenIssuer, StaticIdentityVerifier};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
        SqliteCharacterRepository, SqliteNovelRepository, SqlitePlaceRepository,
        SqliteUserRepository,
    };

    async fn test_app() -> Router {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let state = AppState::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(SqliteNovelRepository::new(pool.clone())),
            Arc::new(SqliteChapterRepository::new(pool.clone())),
            Arc::new(SqliteCharacterRepository::new(pool.clone())),
            Arc::new(SqlitePlaceRepository::new(pool)),
            Arc::new(StaticIdentityVerifier::new()),
            Arc::new(SessionTokenIssuer::new("test-secret", "scriven-backend", 60)),
        );

        create_routes().with_state(Arc::new(state))
    }

    fn post_json(uri: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping_returns_service_status() {
        let app = test_app().await;
        let request = HttpRequest::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_and_fetch_novel_through_api() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/novel/create",
                json!({"title": "Dawn", "owner_user_id": "u1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["errno"], 0);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json("/api/novel/get", json!({"id": id})))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["title"], "Dawn");
        assert_eq!(body["data"]["visibility"], "private");
    }

    #[tokio::test]
    async fn test_chapter_order_is_assigned_by_server() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/novel/create_with_chapter",
                json!({
                    "title": "Dawn",
                    "owner_user_id": "u1",
                    "chapter_title": "Chapter 1",
                    "initial_content": "Hello world"
                }),
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["chapter"]["order_index"], 0);
        assert_eq!(body["data"]["chapter"]["word_count"], 2);
        let novel_id = body["data"]["novel"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json(
                "/api/chapter/add",
                json!({
                    "novel_id": novel_id,
                    "title": "Chapter 2",
                    "content": "word word word word word",
                    "editor_user_id": "u1"
                }),
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["order_index"], 1);
        assert_eq!(body["data"]["word_count"], 5);
        assert_eq!(body["data"]["status"], "draft");
    }

    #[tokio::test]
    async fn test_missing_chapter_is_errno_404_in_http_200() {
        let app = test_app().await;

        let response = app
            .oneshot(post_json("/api/chapter/get", json!({"id": Uuid::new_v4()})))
            .await
            .unwrap();

        // 业务错误也走 HTTP 200，错误码在信封里
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["errno"], 404);
    }
}
