use std::sync::Arc;

use crate::rate_limit::{AdmissionGuard, Quotas, RateLimitStore, SlidingWindowPolicy};
use crate::upstream::Upstream;

// app's shared state
pub struct AppState {
    pub upstream: Upstream,
    pub guard: AdmissionGuard,
    pub store: Arc<RateLimitStore>, // same store the guard writes to
}

impl AppState {
    pub fn new(upstream: Upstream, quotas: Quotas) -> Self {
        let store = Arc::new(RateLimitStore::new());
        let policy = SlidingWindowPolicy::new(Arc::clone(&store), quotas);

        Self {
            upstream,
            guard: AdmissionGuard::new(Arc::new(policy)),
            store,
        }
    }
}
