mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::deserializers::deserialize_lenient_u32;

/// Label the frontend shows above the question list; it never changes.
pub const CURRENT_CATEGORY: &str = "Sports";

pub type ApiResponse<T> = Result<T, ApiError>;

/// Every failure is reported as one of these, the cause only goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("request cannot be processed")]
    Unprocessable,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> ApiError {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            error => {
                tracing::error!("Database error: {error}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    tracing::info!("No route for {method} {uri}");
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    limit: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    page: Option<u32>,
}

impl Pagination {
    /// `(limit, offset)` for a 1-based page; page 0 and offsets past `i64::MAX` are empty.
    pub fn window(&self, per_page: u32) -> (i64, i64) {
        let limit = i64::from(self.limit.unwrap_or(per_page));
        match self.page.unwrap_or(1) {
            0 => (0, 0),
            page => match (i64::from(page) - 1).checked_mul(limit) {
                Some(offset) => (limit, offset),
                None => (0, 0),
            },
        }
    }
}
