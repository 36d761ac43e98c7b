//! Sharded sliding-window rate limiter.

use std::hash::BuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use ahash::AHashMap;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rate_limit::clock::{Clock, SystemClock};
use crate::rate_limit::config::RateLimitConfig;
use crate::rate_limit::window::{ClientWindow, RateLimitDecision};

type Shard = Mutex<AHashMap<String, ClientWindow>>;

/// Counters describing limiter activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterStats {
    /// Requests admitted.
    pub admitted: u64,
    /// Requests rejected for exceeding the quota.
    pub limited: u64,
    /// Client entries removed by idle sweeps.
    pub evicted: u64,
    /// Clients currently tracked.
    pub tracked_clients: usize,
}

/// Per-client sliding-window rate limiter.
///
/// Clients are spread over a fixed number of shards by hashing their
/// identifier; each shard has its own lock, so admission for one client is a
/// single prune-check-record step that never races with another admission for
/// the same client, and clients in different shards never contend.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    idle_retention: Duration,
    clock: Arc<dyn Clock>,
    shards: Box<[Shard]>,
    hash_builder: ahash::RandomState,
    admitted: AtomicU64,
    limited: AtomicU64,
    evicted: AtomicU64,
}

impl SlidingWindowLimiter {
    /// Create a limiter driven by the system clock.
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter driven by `clock`.
    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let shards = (0..config.shards)
            .map(|_| Mutex::new(AHashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            window: config.window(),
            max_requests: config.max_requests,
            idle_retention: config.idle_retention(),
            clock,
            shards,
            hash_builder: ahash::RandomState::new(),
            admitted: AtomicU64::new(0),
            limited: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        })
    }

    fn shard(&self, client_id: &str) -> &Shard {
        let index = self.hash_builder.hash_one(client_id) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Admit or reject a request from `client_id` at the current time.
    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        self.check_at(client_id, self.clock.now())
    }

    /// Admit or reject a request from `client_id` at `now`.
    ///
    /// Rejected requests are not recorded and do not use up quota.
    pub fn check_at(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let decision = {
            let mut shard = self.shard(client_id).lock();
            shard
                .entry(client_id.to_owned())
                .or_default()
                .try_admit(now, self.window, self.max_requests)
        };

        match decision {
            RateLimitDecision::Allowed { .. } => self.admitted.fetch_add(1, Ordering::Relaxed),
            RateLimitDecision::Limited { .. } => self.limited.fetch_add(1, Ordering::Relaxed),
        };

        decision
    }

    /// Whether a request from `client_id` is admitted at the current time.
    pub fn admit(&self, client_id: &str) -> bool {
        self.check(client_id).is_allowed()
    }

    /// Whether a request from `client_id` is admitted at `now`.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> bool {
        self.check_at(client_id, now).is_allowed()
    }

    /// Requests `client_id` may still make in the current window.
    pub fn remaining(&self, client_id: &str) -> usize {
        self.remaining_at(client_id, self.clock.now())
    }

    /// Requests `client_id` may still make in the window ending at `now`.
    ///
    /// Unknown clients have the full quota. Never mutates limiter state.
    pub fn remaining_at(&self, client_id: &str, now: Instant) -> usize {
        let shard = self.shard(client_id).lock();
        let used = shard
            .get(client_id)
            .map_or(0, |window| window.live_count(now, self.window));
        self.max_requests.saturating_sub(used)
    }

    /// Evict clients idle for longer than the retention period.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now())
    }

    /// Evict clients idle at `now`. Returns the number of entries removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut removed = 0;

        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            let before = shard.len();
            shard.retain(|_, window| !window.is_idle(now, self.window, self.idle_retention));
            removed += before - shard.len();
        }

        if removed > 0 {
            self.evicted.fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Evicted {removed} idle rate-limit entries");
        }

        removed
    }

    /// Number of clients with an entry.
    pub fn tracked_clients(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Quota per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current activity counters.
    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            limited: self.limited.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            tracked_clients: self.tracked_clients(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::clock::ManualClock;

    fn limiter(max_requests: usize) -> (SlidingWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig::default()
            .with_max_requests(max_requests)
            .with_window_secs(60);
        let limiter = SlidingWindowLimiter::with_clock(&config, clock.clone()).unwrap();
        (limiter, clock)
    }

    #[test]
    fn test_admits_exactly_quota() {
        let (limiter, clock) = limiter(3);

        for _ in 0..3 {
            assert!(limiter.admit("10.0.0.1"));
            clock.advance(Duration::from_secs(1));
        }
        assert!(!limiter.admit("10.0.0.1"));
        assert_eq!(limiter.remaining("10.0.0.1"), 0);
    }

    #[test]
    fn test_admits_again_after_window() {
        let (limiter, clock) = limiter(2);

        assert!(limiter.admit("client"));
        clock.advance(Duration::from_secs(10));
        assert!(limiter.admit("client"));
        assert!(!limiter.admit("client"));

        // 60s after the first admission, its slot frees up
        clock.advance(Duration::from_secs(50));
        assert!(limiter.admit("client"));
        assert!(!limiter.admit("client"));
    }

    #[test]
    fn test_remaining_counts_down_and_never_negative() {
        let (limiter, _clock) = limiter(3);

        assert_eq!(limiter.remaining("client"), 3);
        for k in 1..=3 {
            limiter.admit("client");
            assert_eq!(limiter.remaining("client"), 3 - k);
        }
        for _ in 0..5 {
            assert!(!limiter.admit("client"));
            assert_eq!(limiter.remaining("client"), 0);
        }
    }

    #[test]
    fn test_remaining_for_unknown_client() {
        let (limiter, _clock) = limiter(30);
        assert_eq!(limiter.remaining("never-seen"), 30);
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_clients_are_independent() {
        let (limiter, _clock) = limiter(1);

        assert!(limiter.admit("a"));
        assert!(!limiter.admit("a"));
        assert!(limiter.admit("b"));
        assert_eq!(limiter.remaining("b"), 0);
    }

    #[test]
    fn test_retry_after_reported_when_limited() {
        let (limiter, clock) = limiter(1);

        assert!(limiter.check("client").is_allowed());
        clock.advance(Duration::from_secs(20));

        assert_eq!(
            limiter.check("client"),
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn test_sweep_evicts_idle_clients_only() {
        let (limiter, clock) = limiter(5);

        limiter.admit("idle");
        clock.advance(Duration::from_secs(400));
        limiter.admit("active");

        assert_eq!(limiter.tracked_clients(), 2);
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.remaining("active"), 4);
        assert_eq!(limiter.remaining("idle"), 5);
        assert_eq!(limiter.stats().evicted, 1);
    }

    #[test]
    fn test_stats() {
        let (limiter, _clock) = limiter(1);

        limiter.admit("client");
        limiter.admit("client");
        limiter.admit("client");

        let stats = limiter.stats();
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.limited, 2);
        assert_eq!(stats.tracked_clients, 1);
    }

    #[test]
    fn test_single_shard() {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig::default().with_max_requests(1).with_shards(1);
        let limiter = SlidingWindowLimiter::with_clock(&config, clock).unwrap();

        assert!(limiter.admit("a"));
        assert!(limiter.admit("b"));
        assert!(!limiter.admit("a"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RateLimitConfig::default().with_max_requests(0);
        assert!(SlidingWindowLimiter::new(&config).is_err());
    }
}
