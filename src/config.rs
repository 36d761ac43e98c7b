//! Service configuration.
//!
//! Configuration is read from an optional JSON file; any field left out takes
//! its default. Command-line flags (and their environment variables) override
//! the file afterwards. Everything is validated once, before the service
//! accepts a request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TradechatError};
use crate::intent::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::pipeline::DEFAULT_MAX_MESSAGE_LENGTH;
use crate::rate_limit::RateLimitConfig;
use crate::util::fuzzy::ScorerKind;

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum score for accepting an intent, `0..=100`.
    pub threshold: u8,

    /// Similarity function.
    pub scorer: ScorerKind,

    /// Intent table file; the built-in table when unset.
    pub intents_path: Option<PathBuf>,

    /// Response table file; the built-in table when unset.
    pub responses_path: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            scorer: ScorerKind::Partial,
            intents_path: None,
            responses_path: None,
        }
    }
}

/// Configuration for the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,

    /// Maximum message length, in characters.
    pub max_message_length: usize,

    /// Classifier settings.
    pub classifier: ClassifierConfig,

    /// Rate limiter settings.
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            classifier: ClassifierConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TradechatError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            TradechatError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.classifier.threshold > 100 {
            return Err(TradechatError::config(format!(
                "confidence threshold must be within 0..=100, got {}",
                self.classifier.threshold
            )));
        }
        if self.max_message_length == 0 {
            return Err(TradechatError::config(
                "maximum message length must be positive",
            ));
        }
        if self.host.trim().is_empty() {
            return Err(TradechatError::config("host cannot be empty"));
        }
        self.rate_limit.validate()
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
