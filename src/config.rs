use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;
use crate::rate_limit::{Operation, QuotaPolicy, Quotas};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "citation-gateway")]
#[command(about = "Rate limited gateway for search, answer generation and citations")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // Search service base url
    #[arg(short, long, default_value = "http://localhost:9000")]
    pub search_url: String,

    // Model runtime backends (comma-separated)
    // Example: "localhost:9001,localhost:9002"
    #[arg(short, long, default_value = "localhost:9001")]
    pub backends: String,

    // Max search requests per window
    #[arg(long, default_value_t = 20)]
    pub search_limit: u32,

    // Search window in seconds
    #[arg(long, default_value_t = 3600)]
    pub search_window: u64,

    // Max answer requests per window
    #[arg(long, default_value_t = 100)]
    pub answer_limit: u32,

    // Answer window in seconds
    #[arg(long, default_value_t = 3600)]
    pub answer_window: u64,

    // Max citation requests per window
    #[arg(long, default_value_t = 500)]
    pub citations_limit: u32,

    // Citations window in seconds
    #[arg(long, default_value_t = 3600)]
    pub citations_window: u64,

    // Forget clients idle for this many seconds (>= longest window)
    #[arg(long, default_value_t = 7200)]
    pub idle_ttl: u64,

    // How often the idle sweeper runs, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,

    // Backend health check interval in seconds
    #[arg(long, default_value_t = 30)]
    pub health_interval: u64,
}

impl Args {
    pub fn quotas(&self) -> Result<Quotas, ConfigError> {
        Ok(Quotas {
            search: QuotaPolicy::new(
                Operation::Search,
                self.search_limit,
                Duration::from_secs(self.search_window),
            )?,
            answer: QuotaPolicy::new(
                Operation::Answer,
                self.answer_limit,
                Duration::from_secs(self.answer_window),
            )?,
            citations: QuotaPolicy::new(
                Operation::Citations,
                self.citations_limit,
                Duration::from_secs(self.citations_window),
            )?,
        })
    }

    // Eviction settings, checked against the quotas they must not undercut.
    pub fn eviction(&self, quotas: &Quotas) -> Result<(Duration, Duration), ConfigError> {
        let idle_ttl = Duration::from_secs(self.idle_ttl);
        let window = quotas.longest_window();

        if idle_ttl < window {
            return Err(ConfigError::IdleTtlTooShort { idle_ttl, window });
        }
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }

        Ok((idle_ttl, Duration::from_secs(self.sweep_interval)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("citation-gateway").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let quotas = args.quotas().unwrap();

        assert_eq!(quotas.search.max_requests(), 20);
        assert_eq!(quotas.answer.max_requests(), 100);
        assert_eq!(quotas.citations.max_requests(), 500);
        assert_eq!(quotas.search.window(), Duration::from_secs(3600));

        let (idle_ttl, every) = args.eviction(&quotas).unwrap();
        assert_eq!(idle_ttl, Duration::from_secs(7200));
        assert_eq!(every, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_quota_fails_at_startup() {
        let args = parse(&["--answer-limit", "0"]);
        assert!(matches!(args.quotas(), Err(ConfigError::ZeroQuota(Operation::Answer))));

        let args = parse(&["--citations-window", "0"]);
        assert!(matches!(
            args.quotas(),
            Err(ConfigError::ZeroWindow(Operation::Citations))
        ));
    }

    #[test]
    fn test_huge_window_fails_at_startup() {
        let args = parse(&["--search-window", "18446744073709551615", "--idle-ttl", "18446744073709551615"]);
        assert!(matches!(
            args.quotas(),
            Err(ConfigError::WindowTooLong { operation: Operation::Search, .. })
        ));
    }

    #[test]
    fn test_idle_ttl_must_cover_windows() {
        let args = parse(&["--search-window", "86400"]);
        let quotas = args.quotas().unwrap();
        assert!(matches!(
            args.eviction(&quotas),
            Err(ConfigError::IdleTtlTooShort { .. })
        ));
    }
}
