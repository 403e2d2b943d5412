use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

use crate::rate_limit::middleware::apply_rate_limit_headers;
use crate::rate_limit::policy::{Decision, Operation};

// Startup only - any of these aborts the process
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max requests for `{0}` must be positive")]
    ZeroQuota(Operation),
    #[error("rate limit window for `{0}` must be positive")]
    ZeroWindow(Operation),
    #[error("rate limit window for `{operation}` ({window:?}) exceeds the maximum of {max:?}")]
    WindowTooLong {
        operation: Operation,
        window: Duration,
        max: Duration,
    },
    #[error("idle TTL ({idle_ttl:?}) must be at least the longest rate limit window ({window:?})")]
    IdleTtlTooShort { idle_ttl: Duration, window: Duration },
    #[error("sweep interval must be positive")]
    ZeroSweepInterval,
    #[error("at least one backend required")]
    NoBackends,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded. Try again in {} seconds.", .0.reset_secs())]
    RateLimited(Decision),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("No healthy backends available")]
    NoHealthyBackend,
    #[error("Metrics encoding failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::NoHealthyBackend => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if let ApiError::RateLimited(decision) = &self {
            apply_rate_limit_headers(response.headers_mut(), decision);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limited_response() {
        let decision = Decision {
            allowed: false,
            remaining: 0,
            reset_seconds: 41.3,
            limit: 20,
        };
        let response = ApiError::RateLimited(decision).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "42");
        assert_eq!(response.headers()["x-ratelimit-reset"], "42");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-limit"], "20");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Rate limit exceeded. Try again in 42 seconds.");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NoHealthyBackend.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
