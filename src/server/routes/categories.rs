use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    db::queries::{
        categories::{get_all_categories, get_category, labels},
        questions::get_questions_page_for_category,
    },
    server::app::{AppState, PageSize},
};

use super::{ApiError, ApiResponse, Pagination};

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<Value>> {
    let categories = get_all_categories(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "categories": labels(&categories),
        "total_categories": categories.len(),
    })))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    State(PageSize(per_page)): State<PageSize>,
    path: Result<Path<i64>, PathRejection>,
    Query(pagination): Query<Pagination>,
) -> ApiResponse<Json<Value>> {
    let Path(id) = path.map_err(|_| ApiError::NotFound)?;
    let current_category = get_category(&pool, id).await?.ok_or(ApiError::NotFound)?;

    let (limit, offset) = pagination.window(per_page);
    let questions = get_questions_page_for_category(&pool, id, limit, offset)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to load questions for category {id}: {e}");
            ApiError::NotFound
        })?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    let categories = get_all_categories(&pool).await?;
    Ok(Json(json!({
        "success": true,
        "total_questions": questions.len(),
        "questions": questions,
        "current_category": current_category,
        "categories": categories,
    })))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
