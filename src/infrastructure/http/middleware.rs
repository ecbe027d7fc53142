//! HTTP Middleware
//!
//! 请求跟踪中间件

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 请求跟踪中间件
///
/// 业务失败走 HTTP 200 + errno，在 ApiError::into_response() 里记录；
/// 此处的 4xx/5xx 只会是传输层问题：路由不存在、JSON 解析失败、
/// 请求体超限，或 handler panic 转出的 500。全部请求带耗时打点。
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%method, path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, path, status, elapsed_ms, "Request rejected");
    } else {
        tracing::debug!(%method, path, status, elapsed_ms, "Request completed");
    }

    response
}
