use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::movies::MoviesResponse;
use super::response::success;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct YearsRequest {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenresRequest {
    #[serde(default)]
    pub genres: Vec<String>,
}

/// 获取当前筛选状态
pub async fn get_filters(State(state): State<AppState>) -> impl IntoResponse {
    success(state.session.filters_state())
}

/// 日期选择器修改年份
pub async fn set_years(
    State(state): State<AppState>,
    Json(request): Json<YearsRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.start_year.is_none() && request.end_year.is_none() {
        return Err(ApiError::BadRequest(
            "start_year or end_year is required".to_string(),
        ));
    }

    state
        .session
        .set_years(request.start_year, request.end_year)
        .await?;
    Ok(success(MoviesResponse::from_session(&state.session)))
}

/// 评分滑块修改评分区间
pub async fn set_rating(
    State(state): State<AppState>,
    Json(request): Json<RatingRequest>,
) -> ApiResult<impl IntoResponse> {
    state.session.set_rating(request.min, request.max).await?;
    Ok(success(MoviesResponse::from_session(&state.session)))
}

/// 修改已选类型，空列表表示清空
pub async fn set_genres(
    State(state): State<AppState>,
    Json(request): Json<GenresRequest>,
) -> ApiResult<impl IntoResponse> {
    state.session.set_genres(request.genres).await?;
    Ok(success(MoviesResponse::from_session(&state.session)))
}

/// 重置全部筛选条件
pub async fn reset_filters(State(state): State<AppState>) -> impl IntoResponse {
    state.session.reset_filters().await;
    success(MoviesResponse::from_session(&state.session))
}
