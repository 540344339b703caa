use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    db::queries::questions::random_question,
    server::{
        app::AppState,
        deserializers::{LenientI64, QuizCategory},
    },
    telemetry::QUIZ_QUESTION_CNTR,
};

use super::{ApiError, ApiResponse};

#[derive(Deserialize)]
struct QuizBody {
    #[serde(default)]
    previous_questions: Vec<LenientI64>,
    #[serde(default)]
    quiz_category: QuizCategory,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Json<Value>> {
    let Json(body) = body.map_err(|e| {
        tracing::info!("Rejected quiz request: {e}");
        ApiError::NotFound
    })?;
    let previous: Vec<i64> = body.previous_questions.iter().map(|id| id.0).collect();
    let category = body.quiz_category.id();

    let question = random_question(&pool, category, &previous)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to pick a quiz question: {e}");
            ApiError::NotFound
        })?;

    match &question {
        Some(q) => {
            let label = category.map_or_else(|| "all".to_owned(), |id| id.to_string());
            QUIZ_QUESTION_CNTR.with_label_values(&[label.as_str()]).inc();
            tracing::debug!("Quiz picked question {} after {} previous", q.id, previous.len());
        }
        None => tracing::debug!("Quiz exhausted after {} questions", previous.len()),
    }

    Ok(Json(json!({
        "success": true,
        "question": question,
    })))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
