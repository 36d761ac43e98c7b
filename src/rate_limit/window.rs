//! Per-client log of admitted request timestamps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request was admitted and recorded.
    Allowed {
        /// Requests still available in the current window.
        remaining: usize,
    },
    /// The quota is used up; nothing was recorded.
    Limited {
        /// Time until the oldest recorded request leaves the window.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Timestamps of a client's admitted requests, oldest first.
///
/// A timestamp `ts` is live while `now - ts < window`; anything older is
/// dropped by [`ClientWindow::prune`].
#[derive(Debug, Clone, Default)]
pub struct ClientWindow {
    timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop timestamps that have left the window.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of live timestamps, without pruning.
    pub fn live_count(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .filter(|&&ts| now.saturating_duration_since(ts) < window)
            .count()
    }

    /// Prune, then record `now` if fewer than `max_requests` remain live.
    pub fn try_admit(
        &mut self,
        now: Instant,
        window: Duration,
        max_requests: usize,
    ) -> RateLimitDecision {
        self.prune(now, window);

        if self.timestamps.len() >= max_requests {
            return RateLimitDecision::Limited {
                retry_after: self.retry_after(now, window),
            };
        }

        // Timestamps never go backwards, keeping the log sorted
        let ts = self.timestamps.back().map_or(now, |&last| now.max(last));
        self.timestamps.push_back(ts);

        RateLimitDecision::Allowed {
            remaining: max_requests - self.timestamps.len(),
        }
    }

    /// Time until the oldest live timestamp expires, zero if there is none.
    pub fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        self.timestamps
            .iter()
            .find(|&&ts| now.saturating_duration_since(ts) < window)
            .map_or(Duration::ZERO, |&oldest| {
                window.saturating_sub(now.saturating_duration_since(oldest))
            })
    }

    /// Whether the window has been empty for at least `retention`.
    pub fn is_idle(&self, now: Instant, window: Duration, retention: Duration) -> bool {
        match self.timestamps.back() {
            Some(&newest) => now.saturating_duration_since(newest) >= window + retention,
            None => true,
        }
    }

    /// Number of recorded timestamps, including any not yet pruned.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_admits_up_to_quota() {
        let start = Instant::now();
        let mut window = ClientWindow::new();

        assert_eq!(
            window.try_admit(start, WINDOW, 2),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            window.try_admit(start, WINDOW, 2),
            RateLimitDecision::Allowed { remaining: 0 }
        );
        assert!(!window.try_admit(start, WINDOW, 2).is_allowed());
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_prune_drops_expired() {
        let start = Instant::now();
        let mut window = ClientWindow::new();
        window.try_admit(start, WINDOW, 5);
        window.try_admit(start + Duration::from_secs(30), WINDOW, 5);

        window.prune(start + Duration::from_secs(59), WINDOW);
        assert_eq!(window.len(), 2);

        window.prune(start + Duration::from_secs(60), WINDOW);
        assert_eq!(window.len(), 1);

        window.prune(start + Duration::from_secs(90), WINDOW);
        assert!(window.is_empty());
    }

    #[test]
    fn test_live_count_does_not_mutate() {
        let start = Instant::now();
        let mut window = ClientWindow::new();
        window.try_admit(start, WINDOW, 5);

        let later = start + Duration::from_secs(61);
        assert_eq!(window.live_count(later, WINDOW), 0);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_retry_after() {
        let start = Instant::now();
        let mut window = ClientWindow::new();
        window.try_admit(start, WINDOW, 1);

        let decision = window.try_admit(start + Duration::from_secs(45), WINDOW, 1);
        assert_eq!(
            decision,
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(15)
            }
        );
    }

    #[test]
    fn test_timestamps_stay_sorted() {
        let start = Instant::now();
        let mut window = ClientWindow::new();
        window.try_admit(start + Duration::from_secs(10), WINDOW, 5);
        window.try_admit(start, WINDOW, 5);

        // The out-of-order admission is recorded at the newest timestamp
        assert_eq!(window.live_count(start + Duration::from_secs(69), WINDOW), 2);
        assert_eq!(window.live_count(start + Duration::from_secs(70), WINDOW), 0);
    }

    #[test]
    fn test_is_idle() {
        let start = Instant::now();
        let retention = Duration::from_secs(300);
        let mut window = ClientWindow::new();
        assert!(window.is_idle(start, WINDOW, retention));

        window.try_admit(start, WINDOW, 5);
        assert!(!window.is_idle(start + Duration::from_secs(359), WINDOW, retention));
        assert!(window.is_idle(start + Duration::from_secs(360), WINDOW, retention));
    }
}
