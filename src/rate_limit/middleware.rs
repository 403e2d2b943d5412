use axum::extract::{Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::rate_limit::guard::AdmissionGuard;
use crate::rate_limit::identity::TransportMetadata;
use crate::rate_limit::policy::{Decision, Operation};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

// shared guard + the operation this route counts against
#[derive(Clone)]
pub struct RouteGuard {
    guard: AdmissionGuard,
    operation: Operation,
}

impl RouteGuard {
    pub fn new(guard: AdmissionGuard, operation: Operation) -> Self {
        Self { guard, operation }
    }
}

// Decide at ingress, attach the advisory headers once the handler's response exists.
// `decision` lives in this frame, so concurrent requests never see each other's values.
pub async fn rate_limit_middleware(
    State(route): State<RouteGuard>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let metadata = TransportMetadata::from_request(&req);
    let decision = route.guard.admit(&metadata, route.operation);

    if !decision.allowed {
        return Err(ApiError::RateLimited(decision));
    }

    let mut response = next.run(req).await;
    apply_rate_limit_headers(response.headers_mut(), &decision);
    Ok(response)
}

pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &Decision) {
    let reset = decision.reset_secs();
    let remaining = if decision.allowed { decision.remaining } else { 0 };

    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset));

    if !decision.allowed {
        headers.insert(RETRY_AFTER, HeaderValue::from(reset));
    }
}
