use axum::routing::{get, post};
use axum::{Router, middleware};
use std::sync::Arc;

use crate::rate_limit::{Operation, RouteGuard, rate_limit_middleware};
use crate::state::AppState;

mod answer;
mod citations;
mod health;
mod metrics;
mod search;

pub use answer::answer_handler;
pub use citations::citations_handler;
pub use health::{health_handler, root_handler};
pub use metrics::metrics_handler;
pub use search::search_handler;

// Build the router; each expensive route is guarded by its own operation quota
pub fn router(state: Arc<AppState>) -> Router {
    let search_guard = RouteGuard::new(state.guard.clone(), Operation::Search);
    let answer_guard = RouteGuard::new(state.guard.clone(), Operation::Answer);
    let citations_guard = RouteGuard::new(state.guard.clone(), Operation::Citations);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/search",
            post(search_handler)
                .layer(middleware::from_fn_with_state(search_guard, rate_limit_middleware)),
        )
        .route(
            "/answer",
            post(answer_handler)
                .layer(middleware::from_fn_with_state(answer_guard, rate_limit_middleware)),
        )
        .route(
            "/get-citations",
            post(citations_handler)
                .layer(middleware::from_fn_with_state(citations_guard, rate_limit_middleware)),
        )
        .with_state(state)
}
