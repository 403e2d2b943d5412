use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use futures::stream::{self, StreamExt};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{SearchQuery, SearchResult};
use crate::state::AppState;

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> impl IntoResponse {
    let search = async move { state.upstream.search(&query).await };
    ([(CONTENT_TYPE, "application/x-ndjson")], search_events(search))
}

// "started" goes out before the search runs, then one closing line:
// the results, or the error if the search service failed
pub fn search_events<F>(search: F) -> Body
where
    F: Future<Output = Result<Vec<SearchResult>, ApiError>> + Send + 'static,
{
    let started = stream::once(async { ndjson_line(serde_json::json!({ "status": "started" })) });

    let finished = stream::once(async move {
        match search.await {
            Ok(results) => ndjson_line(serde_json::json!({
                "status": "complete",
                "results": results
            })),
            Err(e) => ndjson_line(serde_json::json!({
                "status": "error",
                "error": e.to_string()
            })),
        }
    });

    Body::from_stream(started.chain(finished))
}

fn ndjson_line(value: serde_json::Value) -> Result<String, Infallible> {
    Ok(format!("{value}\n"))
}
