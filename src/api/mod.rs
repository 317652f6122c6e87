pub mod error;
pub mod filters;
pub mod health;
pub mod movies;
pub mod response;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::external::{SearchCache, SearchClient};
use crate::services::{BrowseSession, NotificationCenter};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<BrowseSession>,
    pub search_client: Arc<dyn SearchClient>,
    pub cache: SearchCache,
    pub notifications: Arc<NotificationCenter>,
}

/// 构建全部路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Movie Browser Backend API v1.0" }))
        // Health
        .route("/api/health", get(health::health_check))
        .route("/api/cache/clear", post(health::clear_cache))
        .route("/api/notifications", get(health::get_notifications))
        // Movies
        .route("/api/movies", get(movies::get_movies))
        .route("/api/movies/retry", post(movies::retry_movies))
        .route("/api/page", put(movies::change_page))
        // Filters
        .route(
            "/api/filters",
            get(filters::get_filters).delete(filters::reset_filters),
        )
        .route("/api/filters/years", put(filters::set_years))
        .route("/api/filters/rating", put(filters::set_rating))
        .route("/api/filters/genres", put(filters::set_genres))
        .fallback(error::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
