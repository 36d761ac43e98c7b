//! Per-client request throttling over a trailing time window.
//!
//! Each client may make at most `max_requests` requests within any window of
//! `window_secs`. Admitted requests are logged per client; rejected ones are
//! not, so a client hammering the service does not extend its own lockout.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tradechat::rate_limit::{ManualClock, RateLimitConfig, SlidingWindowLimiter};
//!
//! # fn main() -> tradechat::error::Result<()> {
//! let clock = Arc::new(ManualClock::new());
//! let config = RateLimitConfig::default().with_max_requests(2);
//! let limiter = SlidingWindowLimiter::with_clock(&config, clock.clone())?;
//!
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(!limiter.admit("203.0.113.7"));
//!
//! clock.advance(Duration::from_secs(60));
//! assert!(limiter.admit("203.0.113.7"));
//! # Ok(())
//! # }
//! ```

mod clock;
mod config;
mod limiter;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RateLimitConfig;
pub use limiter::{LimiterStats, SlidingWindowLimiter};
pub use window::{ClientWindow, RateLimitDecision};
