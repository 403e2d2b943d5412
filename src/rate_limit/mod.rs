pub mod guard;
pub mod identity;
pub mod middleware;
pub mod policy;
pub mod store;

pub use guard::AdmissionGuard;
pub use identity::{TransportMetadata, UNKNOWN_CLIENT, resolve_identity};
pub use middleware::{RouteGuard, rate_limit_middleware};
pub use policy::{Decision, Operation, QuotaPolicy, Quotas, SlidingWindowPolicy};
pub use store::{Admission, RateLimitStore, idle_sweeper};
