use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::rate_limit::store::RateLimitStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Answer,
    Citations,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Search, Operation::Answer, Operation::Citations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::Answer => "answer",
            Operation::Citations => "citations",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Longest window we accept; keeps `Instant + window` far from overflow
pub const MAX_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// at most `max_requests` inside any trailing `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    max_requests: u32,
    window: Duration,
}

impl QuotaPolicy {
    pub fn new(operation: Operation, max_requests: u32, window: Duration) -> Result<Self, ConfigError> {
        if max_requests == 0 {
            return Err(ConfigError::ZeroQuota(operation));
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow(operation));
        }
        if window > MAX_WINDOW {
            return Err(ConfigError::WindowTooLong {
                operation,
                window,
                max: MAX_WINDOW,
            });
        }
        Ok(Self {
            max_requests,
            window,
        })
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

// a field per operation, so none can be left unconfigured
#[derive(Debug, Clone, Copy)]
pub struct Quotas {
    pub search: QuotaPolicy,
    pub answer: QuotaPolicy,
    pub citations: QuotaPolicy,
}

impl Quotas {
    pub fn get(&self, operation: Operation) -> &QuotaPolicy {
        match operation {
            Operation::Search => &self.search,
            Operation::Answer => &self.answer,
            Operation::Citations => &self.citations,
        }
    }

    pub fn longest_window(&self) -> Duration {
        Operation::ALL
            .iter()
            .map(|op| self.get(*op).window)
            .max()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_seconds: f64,
    pub limit: u32,
}

impl Decision {
    // wire value, rounded up
    pub fn reset_secs(&self) -> u64 {
        self.reset_seconds.max(0.0).ceil() as u64
    }
}

#[derive(Clone)]
pub struct SlidingWindowPolicy {
    store: Arc<RateLimitStore>,
    quotas: Quotas,
}

impl SlidingWindowPolicy {
    pub fn new(store: Arc<RateLimitStore>, quotas: Quotas) -> Self {
        Self { store, quotas }
    }

    pub fn evaluate(&self, identity: &str, operation: Operation) -> Decision {
        self.evaluate_at(identity, operation, Instant::now())
    }

    pub fn evaluate_at(&self, identity: &str, operation: Operation, now: Instant) -> Decision {
        let quota = self.quotas.get(operation);
        let admission = self.store.check_and_record(
            identity,
            operation.as_str(),
            now,
            quota.max_requests,
            quota.window,
        );

        Decision {
            allowed: admission.admitted,
            remaining: admission.remaining,
            reset_seconds: admission.reset_seconds,
            limit: quota.max_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotas(search: u32, answer: u32, citations: u32) -> Quotas {
        let hour = Duration::from_secs(3600);
        Quotas {
            search: QuotaPolicy::new(Operation::Search, search, hour).unwrap(),
            answer: QuotaPolicy::new(Operation::Answer, answer, hour).unwrap(),
            citations: QuotaPolicy::new(Operation::Citations, citations, Duration::from_secs(60))
                .unwrap(),
        }
    }

    #[test]
    fn test_quota_rejects_zero_values() {
        assert!(matches!(
            QuotaPolicy::new(Operation::Search, 0, Duration::from_secs(1)),
            Err(ConfigError::ZeroQuota(Operation::Search))
        ));
        assert!(matches!(
            QuotaPolicy::new(Operation::Answer, 1, Duration::ZERO),
            Err(ConfigError::ZeroWindow(Operation::Answer))
        ));
    }

    #[test]
    fn test_quota_rejects_overflowing_window() {
        assert!(matches!(
            QuotaPolicy::new(Operation::Search, 1, Duration::from_secs(u64::MAX)),
            Err(ConfigError::WindowTooLong { operation: Operation::Search, .. })
        ));
        assert!(QuotaPolicy::new(Operation::Search, 1, MAX_WINDOW).is_ok());
        assert!(QuotaPolicy::new(Operation::Search, 1, MAX_WINDOW + Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_longest_accepted_window_does_not_overflow() {
        let quota = QuotaPolicy::new(Operation::Answer, 1, MAX_WINDOW).unwrap();
        let policy = SlidingWindowPolicy::new(
            Arc::new(RateLimitStore::new()),
            Quotas {
                search: quota,
                answer: quota,
                citations: quota,
            },
        );
        let now = Instant::now();

        assert!(policy.evaluate_at("c", Operation::Answer, now).allowed);
        let denied = policy.evaluate_at("c", Operation::Answer, now);
        assert!(!denied.allowed);
        assert_eq!(denied.reset_secs(), MAX_WINDOW.as_secs());
    }

    #[test]
    fn test_decision_echoes_limit() {
        let policy = SlidingWindowPolicy::new(Arc::new(RateLimitStore::new()), quotas(20, 100, 500));
        let now = Instant::now();

        let d = policy.evaluate_at("10.0.0.1", Operation::Answer, now);
        assert!(d.allowed);
        assert_eq!(d.limit, 100);
        assert_eq!(d.remaining, 99);
        assert_eq!(d.reset_secs(), 3600);
    }

    #[test]
    fn test_exhausting_search_leaves_other_operations() {
        let policy = SlidingWindowPolicy::new(Arc::new(RateLimitStore::new()), quotas(2, 2, 2));
        let now = Instant::now();

        policy.evaluate_at("c", Operation::Search, now);
        policy.evaluate_at("c", Operation::Search, now);
        let denied = policy.evaluate_at("c", Operation::Search, now);
        assert!(!denied.allowed);
        assert_eq!(denied.limit, 2);

        for op in [Operation::Answer, Operation::Citations] {
            let d = policy.evaluate_at("c", op, now);
            assert!(d.allowed, "{op} should be unaffected");
            assert_eq!(d.remaining, 1);
        }
    }

    #[test]
    fn test_reset_rounds_up() {
        let d = Decision {
            allowed: false,
            remaining: 0,
            reset_seconds: 56.2,
            limit: 3,
        };
        assert_eq!(d.reset_secs(), 57);

        let zero = Decision { reset_seconds: 0.0, ..d };
        assert_eq!(zero.reset_secs(), 0);
    }

    #[test]
    fn test_longest_window() {
        assert_eq!(quotas(1, 1, 1).longest_window(), Duration::from_secs(3600));
    }
}
