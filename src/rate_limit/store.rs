use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::metrics::TRACKED_CLIENTS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    pub admitted: bool,
    pub remaining: u32,
    // until the oldest counted request leaves the window
    pub reset_seconds: f64,
}

// Everything we know about one client, one log per operation
struct ClientLogs {
    logs: HashMap<String, VecDeque<Instant>>,
    last_seen: Instant,
    // set by the sweeper once this entry left the map
    evicted: bool,
}

impl ClientLogs {
    fn new(now: Instant) -> Self {
        Self {
            logs: HashMap::new(),
            last_seen: now,
            evicted: false,
        }
    }
}

// The map only hands out per-client entries; prune/compare/append runs
// under that client's own mutex
#[derive(Default)]
pub struct RateLimitStore {
    clients: DashMap<String, Arc<Mutex<ClientLogs>>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Denied calls leave the log untouched
    pub fn check_and_record(
        &self,
        identity: &str,
        operation: &str,
        now: Instant,
        max_requests: u32,
        window: Duration,
    ) -> Admission {
        loop {
            let entry = self.client_entry(identity, now);
            let mut client = entry.lock().unwrap_or_else(PoisonError::into_inner);

            // lost a race with the sweeper, look the client up again
            if client.evicted {
                continue;
            }

            client.last_seen = client.last_seen.max(now);
            let log = client.logs.entry(operation.to_string()).or_default();

            while let Some(&oldest) = log.front() {
                if now.saturating_duration_since(oldest) >= window {
                    log.pop_front();
                } else {
                    break;
                }
            }

            let admitted = log.len() < max_requests as usize;
            if admitted {
                log.push_back(now);
            }

            let used = u32::try_from(log.len()).unwrap_or(u32::MAX);
            let reset_seconds = log
                .front()
                .map(|&oldest| (oldest + window).saturating_duration_since(now).as_secs_f64())
                .unwrap_or(0.0);

            return Admission {
                admitted,
                remaining: max_requests.saturating_sub(used),
                reset_seconds,
            };
        }
    }

    // Clone the handle out so the shard lock is released before we lock the client
    fn client_entry(&self, identity: &str, now: Instant) -> Arc<Mutex<ClientLogs>> {
        if let Some(entry) = self.clients.get(identity) {
            return Arc::clone(entry.value());
        }
        Arc::clone(
            self.clients
                .entry(identity.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ClientLogs::new(now))))
                .value(),
        )
    }

    // Returns how many clients were removed
    pub fn evict_idle(&self, now: Instant, idle_ttl: Duration) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, entry| {
            let mut client = entry.lock().unwrap_or_else(PoisonError::into_inner);
            if now.saturating_duration_since(client.last_seen) >= idle_ttl {
                client.evicted = true;
                false
            } else {
                true
            }
        });
        before.saturating_sub(self.clients.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

// Background sweeper - keeps memory bounded by active clients
pub async fn idle_sweeper(store: Arc<RateLimitStore>, idle_ttl: Duration, every: Duration) {
    let mut interval = interval(every);

    tracing::info!(?idle_ttl, ?every, "Idle client sweeper started");

    loop {
        interval.tick().await;

        let evicted = store.evict_idle(Instant::now(), idle_ttl);
        let tracked = store.tracked_clients();
        TRACKED_CLIENTS.set(tracked as f64);

        if evicted > 0 {
            tracing::debug!(evicted, tracked, "Evicted idle clients");
        }
    }
}
