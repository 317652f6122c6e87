use axum::{
    extract::State,
    response::IntoResponse,
};
use serde_json::json;

use super::response::{success, success_message};
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let search_status = if state.search_client.is_available() {
        "available"
    } else {
        "not_configured"
    };

    let cache_stats = state.cache.get_stats();

    success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "movie_api": search_status,
        "search_cache": cache_stats,
    }))
}

/// 清空搜索结果缓存
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.cache.clear_all();
    tracing::info!("Search cache cleared");
    success_message("Search cache cleared")
}

/// 取走待显示的通知
pub async fn get_notifications(State(state): State<AppState>) -> impl IntoResponse {
    success(state.notifications.drain())
}
