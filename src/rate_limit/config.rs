//! Configuration for the sliding-window rate limiter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TradechatError};

/// Configuration for [`crate::rate_limit::SlidingWindowLimiter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Length of the trailing window, in seconds.
    pub window_secs: u64,

    /// Requests a client may make within one window.
    pub max_requests: usize,

    /// How long a client's window must have been empty before its entry is
    /// evicted, in seconds.
    pub idle_retention_secs: u64,

    /// Interval between idle sweeps, in seconds.
    pub sweep_interval_secs: u64,

    /// Number of independently locked shards of the client map.
    pub shards: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 30,
            idle_retention_secs: 300,
            sweep_interval_secs: 60,
            shards: 16,
        }
    }
}

impl RateLimitConfig {
    /// Set the quota per window.
    pub fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Set the window length.
    pub fn with_window_secs(mut self, window_secs: u64) -> Self {
        self.window_secs = window_secs;
        self
    }

    /// Set the idle retention.
    pub fn with_idle_retention_secs(mut self, idle_retention_secs: u64) -> Self {
        self.idle_retention_secs = idle_retention_secs;
        self
    }

    /// Set the shard count.
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Idle retention.
    pub fn idle_retention(&self) -> Duration {
        Duration::from_secs(self.idle_retention_secs)
    }

    /// Sweep interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reject configurations the limiter cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.window_secs == 0 {
            return Err(TradechatError::config("rate limit window must be positive"));
        }
        if self.max_requests == 0 {
            return Err(TradechatError::config(
                "rate limit must allow at least one request per window",
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(TradechatError::config("sweep interval must be positive"));
        }
        if self.shards == 0 {
            return Err(TradechatError::config("rate limiter needs at least one shard"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RateLimitConfig::default();
        config.validate().unwrap();
        assert_eq!(config.window(), Duration::from_secs(60));
        assert_eq!(config.max_requests, 30);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(RateLimitConfig::default().with_window_secs(0).validate().is_err());
        assert!(RateLimitConfig::default().with_max_requests(0).validate().is_err());
        assert!(RateLimitConfig::default().with_shards(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RateLimitConfig = serde_json::from_str(r#"{"max_requests": 5}"#).unwrap();
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window_secs, 60);
    }
}
