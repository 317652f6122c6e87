use axum::{
    extract::{RawQuery, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::response::success;
use super::AppState;
use crate::services::{BrowseSession, FiltersState, MoviesView, UrlState};

/// 电影列表响应：渲染状态 + 筛选状态
#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub view: MoviesView,
    pub filters: FiltersState,
}

impl MoviesResponse {
    pub fn from_session(session: &BrowseSession) -> Self {
        Self {
            view: session.view(),
            filters: session.filters_state(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: u32,
}

/// 导航到请求中的 URL 查询参数并返回结果
///
/// 查询字符串原样作为页面 URL 处理，非法参数在解码时替换为默认值。
pub async fn get_movies(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let url = UrlState::parse(query.as_deref().unwrap_or_default());
    let outcome = state.session.navigate(url).await;
    tracing::debug!("GET /api/movies -> {:?}", outcome);

    success(MoviesResponse::from_session(&state.session))
}

/// 手动重试上一次请求
pub async fn retry_movies(State(state): State<AppState>) -> impl IntoResponse {
    state.session.retry().await;
    success(MoviesResponse::from_session(&state.session))
}

/// 翻页
pub async fn change_page(
    State(state): State<AppState>,
    Json(request): Json<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    state.session.change_page(request.page).await?;
    Ok(success(MoviesResponse::from_session(&state.session)))
}
