use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::CitationQuery;
use crate::state::AppState;

pub async fn citations_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<CitationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.upstream.forward("/get-citations", &query).await?;
    Ok(([(CONTENT_TYPE, "application/x-ndjson")], body))
}
