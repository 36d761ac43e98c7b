//! Request validation and input sanitization.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::error::{Result, TradechatError};

/// Default maximum message length, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 500;

/// Reasons a chat request is rejected before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Invalid request format")]
    InvalidFormat,

    #[error("Missing 'message' field")]
    MissingMessage,

    #[error("Message must be a string")]
    MessageNotString,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message exceeds {0} characters")]
    MessageTooLong(usize),
}

/// Validates chat request bodies and cleans message text.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    tag_pattern: Regex,
    max_length: usize,
}

impl Sanitizer {
    /// Create a sanitizer that clamps messages to `max_length` characters.
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(TradechatError::config(
                "maximum message length must be positive",
            ));
        }

        Ok(Self {
            tag_pattern: Regex::new(r"<[^>]*>")
                .map_err(|e| TradechatError::other(format!("invalid tag pattern: {e}")))?,
            max_length,
        })
    }

    /// Maximum accepted message length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Extract the message from a request body.
    ///
    /// The body must be an object whose `message` is a string of
    /// `1..=max_length` characters.
    pub fn validate<'a>(&self, body: &'a Value) -> std::result::Result<&'a str, RequestError> {
        let object = body.as_object().ok_or(RequestError::InvalidFormat)?;
        let message = object.get("message").ok_or(RequestError::MissingMessage)?;
        let message = message.as_str().ok_or(RequestError::MessageNotString)?;

        let length = message.chars().count();
        if length == 0 {
            return Err(RequestError::EmptyMessage);
        }
        if length > self.max_length {
            return Err(RequestError::MessageTooLong(self.max_length));
        }

        Ok(message)
    }

    /// Strip control characters and markup tags, clamp the length and trim.
    pub fn sanitize(&self, text: &str) -> String {
        let without_controls: String = text.chars().filter(|c| !c.is_control()).collect();
        let without_tags = self.tag_pattern.replace_all(&without_controls, "");
        let clamped: String = without_tags.chars().take(self.max_length).collect();

        clamped.trim().to_string()
    }
}
