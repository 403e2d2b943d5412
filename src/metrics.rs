use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUESTS_ADMITTED: CounterVec = register_counter_vec!(
        "gateway_requests_admitted_total",
        "Requests admitted by the rate limiter",
        &["operation"]
    )
    .unwrap();
    pub static ref REQUESTS_DENIED: CounterVec = register_counter_vec!(
        "gateway_requests_denied_total",
        "Requests rejected by the rate limiter",
        &["operation"]
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("gateway_tracked_clients", "Clients currently held by the rate limiter").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_latency_seconds",
        "Upstream call latency in seconds"
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("gateway_upstream_errors_total", "Failed upstream calls").unwrap();
}
