use std::sync::Arc;

use crate::metrics::{REQUESTS_ADMITTED, REQUESTS_DENIED};
use crate::rate_limit::identity::{TransportMetadata, resolve_identity};
use crate::rate_limit::policy::{Decision, Operation, SlidingWindowPolicy};

#[derive(Clone)]
pub struct AdmissionGuard {
    policy: Arc<SlidingWindowPolicy>,
}

impl AdmissionGuard {
    pub fn new(policy: Arc<SlidingWindowPolicy>) -> Self {
        Self { policy }
    }

    pub fn admit(&self, metadata: &TransportMetadata, operation: Operation) -> Decision {
        let identity = resolve_identity(metadata);
        let decision = self.policy.evaluate(&identity, operation);

        if decision.allowed {
            REQUESTS_ADMITTED.with_label_values(&[operation.as_str()]).inc();
            tracing::debug!(
                client = %identity,
                %operation,
                remaining = decision.remaining,
                "Request admitted"
            );
        } else {
            REQUESTS_DENIED.with_label_values(&[operation.as_str()]).inc();
            tracing::warn!(
                client = %identity,
                %operation,
                limit = decision.limit,
                reset_secs = decision.reset_secs(),
                "Rate limit exceeded"
            );
        }

        decision
    }
}
