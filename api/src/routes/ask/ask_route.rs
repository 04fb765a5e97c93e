//! POST /ask: answers a medical question with retrieved encyclopedia context.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use med_qa::ScoredAnswer;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::AskRequest,
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What are the symptoms of anemia?","k":5}'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<ApiResponse<ScoredAnswer>> {
    let Json(body) = body?;

    if body.question.trim().is_empty() {
        return Err(AppError::bad_request("question", "question must not be empty"));
    }
    let k = body.k.unwrap_or_else(|| state.qa.top_k());
    if k == 0 {
        return Err(AppError::bad_request("k", "k must be at least 1"));
    }
    debug!(k, has_reference = body.reference.is_some(), "POST /ask");

    let scored = state
        .qa
        .answer_with_score(&body.question, body.reference.as_deref(), k)
        .await?;
    Ok(ApiResponse::success(scored))
}
