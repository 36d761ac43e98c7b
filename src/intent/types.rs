//! Common types for intent classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of an intent, e.g. `NAV_MARKETPLACE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(String);

impl IntentId {
    /// Create a new intent identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of this identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IntentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Outcome of classifying one message.
///
/// `confidence` is the best score seen across every intent, and is reported
/// even when `intent` is `None` because nothing reached the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Accepted intent, if the best score reached the threshold.
    pub intent: Option<IntentId>,
    /// Best score across all intents, `0..=100`.
    pub confidence: u8,
    /// Phrase that produced the best score.
    pub matched_phrase: Option<String>,
}

impl Classification {
    /// Classification of a message that matched nothing.
    pub fn unknown() -> Self {
        Self {
            intent: None,
            confidence: 0,
            matched_phrase: None,
        }
    }

    /// Whether an intent was accepted.
    pub fn is_confident(&self) -> bool {
        self.intent.is_some()
    }
}
