//! Error types for the Tradechat library.
//!
//! Every fallible Tradechat operation reports a [`TradechatError`]. Most of
//! these surface at startup, while configuration files and knowledge-base
//! tables are loaded and validated; request handling itself only fails on
//! malformed client input, which is modelled separately by
//! [`crate::pipeline::RequestError`].
//!
//! # Examples
//!
//! ```
//! use tradechat::error::{TradechatError, Result};
//!
//! fn load_threshold(value: u32) -> Result<u8> {
//!     if value > 100 {
//!         return Err(TradechatError::config("threshold must be within 0..=100"));
//!     }
//!     Ok(value as u8)
//! }
//!
//! assert!(load_threshold(75).is_ok());
//! assert!(load_threshold(101).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Tradechat operations.
#[derive(Error, Debug)]
pub enum TradechatError {
    /// I/O errors (config files, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed intent or response table
    #[error("Table error: {0}")]
    Table(String),

    /// HTTP server failures
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TradechatError.
pub type Result<T> = std::result::Result<T, TradechatError>;

impl TradechatError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TradechatError::Config(msg.into())
    }

    /// Create a new table error.
    pub fn table<S: Into<String>>(msg: S) -> Self {
        TradechatError::Table(msg.into())
    }

    /// Create a new server error.
    pub fn server<S: Into<String>>(msg: S) -> Self {
        TradechatError::Server(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        TradechatError::Table(msg.into()) // Parse errors come from table and config files
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TradechatError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TradechatError::config("threshold out of range");
        assert_eq!(
            error.to_string(),
            "Configuration error: threshold out of range"
        );

        let error = TradechatError::table("intent has no phrases");
        assert_eq!(error.to_string(), "Table error: intent has no phrases");

        let error = TradechatError::parse("unexpected token");
        assert_eq!(error.to_string(), "Table error: unexpected token");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = TradechatError::from(io_error);

        match error {
            TradechatError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = TradechatError::from(json_error);
        assert!(matches!(error, TradechatError::Json(_)));
    }
}
