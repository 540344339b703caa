use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    db::queries::{
        categories::{get_all_categories, labels},
        questions::{self, count_questions, get_questions_page, search_questions, NewQuestion},
    },
    server::app::{AppState, PageSize},
    telemetry::{CREATED_QUESTION_CNTR, DELETED_QUESTION_CNTR},
};

use super::{ApiError, ApiResponse, Pagination, CURRENT_CATEGORY};

#[derive(Deserialize)]
struct QuestionBody {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
}

#[derive(Deserialize)]
struct SearchBody {
    search: String,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    State(PageSize(per_page)): State<PageSize>,
    Query(pagination): Query<Pagination>,
) -> ApiResponse<Json<Value>> {
    let (limit, offset) = pagination.window(per_page);
    let questions = get_questions_page(&pool, limit, offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    let categories = get_all_categories(&pool).await?;
    Ok(Json(json!({
        "success": true,
        "questions": questions,
        "total_questions": count_questions(&pool).await?,
        "current_category": CURRENT_CATEGORY,
        "categories": labels(&categories),
    })))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Value>> {
    let Path(id) = path.map_err(|_| ApiError::NotFound)?;
    let unprocessable = |e: sqlx::Error| {
        tracing::warn!("Failed to delete question {id}: {e}");
        ApiError::Unprocessable
    };

    if !questions::delete_question(&pool, id)
        .await
        .map_err(unprocessable)?
    {
        return Err(ApiError::NotFound);
    }
    DELETED_QUESTION_CNTR.inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(json!({
        "success": true,
        "deleted": id,
        "total_questions": count_questions(&pool).await.map_err(unprocessable)?,
    })))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuestionBody>, JsonRejection>,
) -> ApiResponse<Json<Value>> {
    let Json(body) = body.map_err(|e| {
        tracing::info!("Rejected new question: {e}");
        ApiError::Unprocessable
    })?;

    let id = questions::create_question(
        &pool,
        NewQuestion {
            question: &body.question,
            answer: &body.answer,
            category: body.category,
            difficulty: body.difficulty,
        },
    )
    .await
    .map_err(|e| {
        tracing::warn!("Failed to insert question: {e}");
        ApiError::Unprocessable
    })?;
    CREATED_QUESTION_CNTR.inc();
    tracing::info!("Created question {id}");

    Ok(Json(json!({
        "success": true,
        "created": id,
        "total_questions": count_questions(&pool).await?,
    })))
}

// matches are counted but not returned, the frontend only reads the total
async fn search(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<Value>> {
    let Json(SearchBody { search }) = body.map_err(|_| ApiError::Unprocessable)?;
    let found = search_questions(&pool, &search).await?;

    Ok(Json(json!({
        "success": true,
        "total_questions": found.len(),
        "current_category": CURRENT_CATEGORY,
    })))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/", post(create_question))
        .route("/questions/search", post(search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
