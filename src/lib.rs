//! # Tradechat
//!
//! Chat backend for a trading marketplace: free-form user messages are
//! matched against a table of intents with fuzzy string similarity, and each
//! intent maps to a canned reply and a navigation action.
//!
//! ## Features
//!
//! - Partial-ratio fuzzy matching with a deterministic tie-break order
//! - Per-client sliding-window rate limiting, safe under concurrent access
//! - Request validation and sanitization before classification
//! - JSON HTTP API with CORS and security headers

pub mod cli;
pub mod config;
pub mod error;
pub mod intent;
pub mod pipeline;
pub mod rate_limit;
pub mod server;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
