use axum::body::Body;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::load_balancer::LoadBalancer;
use crate::metrics::{UPSTREAM_ERRORS, UPSTREAM_LATENCY};
use crate::models::{SearchQuery, SearchResult};

pub const MAX_SEARCH_RESULTS: usize = 3;
pub const MAX_CONTENT_CHARS: usize = 20_000;

// HTTP client for the search service and the model runtime pool.
pub struct Upstream {
    client: reqwest::Client,
    search_url: String,
    load_balancer: Arc<LoadBalancer>,
}

impl Upstream {
    pub fn new(client: reqwest::Client, search_url: String, load_balancer: Arc<LoadBalancer>) -> Self {
        Self {
            client,
            search_url,
            load_balancer,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiError> {
        let start_time = Instant::now();

        let result = async {
            self.client
                .post(format!("{}/search", self.search_url))
                .json(query)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<SearchResult>>()
                .await
        }
        .await;

        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        match result {
            Ok(results) => Ok(normalize_results(results)),
            Err(e) => {
                UPSTREAM_ERRORS.inc();
                tracing::error!(error = %e, "Search service call failed");
                Err(e.into())
            }
        }
    }

    // POST `body` to `path` on the next healthy model backend. The response
    // body is relayed chunk by chunk, so the backend's ndjson cadence is kept.
    pub async fn forward<T: Serialize>(&self, path: &str, body: &T) -> Result<Body, ApiError> {
        let backend = self
            .load_balancer
            .get_backend()
            .ok_or(ApiError::NoHealthyBackend)?;
        tracing::debug!(url = %backend.url, path, "Forwarding to model backend");

        let start_time = Instant::now();
        let sent = self
            .client
            .post(format!("{}{}", backend.url, path))
            .json(body)
            .send()
            .await;

        // latency up to response headers; the body streams afterwards
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        let result = match sent {
            Ok(res) => res.error_for_status(),
            // connection level failure, out of rotation until the next health check
            Err(e) => {
                backend.set_healthy(false);
                tracing::warn!(url = %backend.url, "Backend failed, marked unhealthy");
                Err(e)
            }
        };

        match result {
            Ok(res) => Ok(Body::from_stream(res.bytes_stream())),
            Err(e) => {
                UPSTREAM_ERRORS.inc();
                tracing::error!(error = %e, path, "Model backend call failed");
                Err(e.into())
            }
        }
    }
}

// Drop duplicate links, cap content length and result count
pub fn normalize_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();

    results
        .into_iter()
        .filter(|r| seen.insert(r.link.clone()))
        .map(|mut r| {
            if let Some((idx, _)) = r.content.char_indices().nth(MAX_CONTENT_CHARS) {
                r.content.truncate(idx);
            }
            r
        })
        .take(MAX_SEARCH_RESULTS)
        .collect()
}
