use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::LanguageModelPrompt;
use crate::state::AppState;

// Generation runs on the model backend; we relay its ndjson token stream as-is
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    Json(prompt): Json<LanguageModelPrompt>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.upstream.forward("/answer", &prompt).await?;
    Ok(([(CONTENT_TYPE, "application/x-ndjson")], body))
}
