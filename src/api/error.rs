use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ValidationError;

/// 统一的API错误类型
///
/// 只有控件输入会产生错误；URL 参数错误在解码时已被默认值替换。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 控件提交了非法的筛选值
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 请求体缺少必要字段
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match &self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
        };
        tracing::debug!("Rejected request ({}): {}", status, message);

        let body = Json(json!({
            "success": false,
            "error": {
                "type": kind,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// 未匹配任何路由
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::BadRequest("missing body".to_string());
        assert_eq!(error.to_string(), "Bad request: missing body");
    }

    #[test]
    fn test_validation_error_maps_to_422() {
        let api_error: ApiError = ValidationError::InvalidPage(0).into();
        assert!(matches!(api_error, ApiError::Validation(_)));
        assert_eq!(api_error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fallback_is_404() {
        let error = not_found(Uri::from_static("/api/unknown")).await;
        assert_eq!(error.to_string(), "Not found: No route for /api/unknown");
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
