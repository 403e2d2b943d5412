// Rate limited HTTP gateway in front of a search service and a model
// runtime pool that generates answers and scores citations.

pub mod config;
pub mod error;
pub mod handlers;
pub mod load_balancer;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod upstream;

pub use config::Args;
pub use error::{ApiError, ConfigError};
pub use state::AppState;
