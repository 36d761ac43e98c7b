//! Ordered intent table: each intent with its accepted synonyms.

use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TradechatError};
use crate::intent::types::IntentId;

const BUILTIN_INTENTS: &str = include_str!("../../resources/intents.json");

/// One intent and its synonym phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentEntry {
    /// Intent identifier.
    pub intent: IntentId,
    /// Accepted phrases, lowercase.
    pub phrases: Vec<String>,
}

impl IntentEntry {
    /// Create a new entry.
    pub fn new<I, S>(intent: impl Into<IntentId>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intent: intent.into(),
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }
}

/// Intent table used by the classifier.
///
/// Entries keep the order they were supplied in. Classification breaks ties
/// in favour of the earlier entry, so the order is part of the table's meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTable {
    entries: Vec<IntentEntry>,
}

impl IntentTable {
    /// Build a table, validating and lowercasing every phrase.
    ///
    /// Fails if the table is empty, an intent id is empty or repeated, or an
    /// intent has no phrases or a blank phrase.
    pub fn new(entries: Vec<IntentEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(TradechatError::table("intent table is empty"));
        }

        let mut seen = AHashSet::with_capacity(entries.len());
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.intent.as_str().trim().is_empty() {
                return Err(TradechatError::table("intent id cannot be empty"));
            }
            if !seen.insert(entry.intent.clone()) {
                return Err(TradechatError::table(format!(
                    "duplicate intent '{}'",
                    entry.intent
                )));
            }
            if entry.phrases.is_empty() {
                return Err(TradechatError::table(format!(
                    "intent '{}' has no phrases",
                    entry.intent
                )));
            }

            let mut phrases = Vec::with_capacity(entry.phrases.len());
            for phrase in entry.phrases {
                if phrase.trim().is_empty() {
                    return Err(TradechatError::table(format!(
                        "intent '{}' has an empty phrase",
                        entry.intent
                    )));
                }
                phrases.push(phrase.to_lowercase());
            }

            normalized.push(IntentEntry {
                intent: entry.intent,
                phrases,
            });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// The knowledge base compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_INTENTS)
    }

    /// Parse a table from a JSON array of `{ "intent", "phrases" }` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<IntentEntry> = serde_json::from_str(json)
            .map_err(|e| TradechatError::parse(format!("Failed to parse intent table: {e}")))?;
        Self::new(entries)
    }

    /// Load a table from a JSON file.
    ///
    /// Example format:
    /// ```json
    /// [
    ///   { "intent": "NAV_MARKETPLACE", "phrases": ["marketplace", "shop"] },
    ///   { "intent": "GREETING", "phrases": ["hello", "hi"] }
    /// ]
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TradechatError::table(format!(
                "Failed to read intent table '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Entries in classification order.
    pub fn iter(&self) -> impl Iterator<Item = &IntentEntry> {
        self.entries.iter()
    }

    /// Look up the phrases of an intent.
    pub fn phrases(&self, intent: &IntentId) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| &entry.intent == intent)
            .map(|entry| entry.phrases.as_slice())
    }

    /// Whether the table defines `intent`.
    pub fn contains(&self, intent: &IntentId) -> bool {
        self.phrases(intent).is_some()
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no intents. Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of phrases across all intents.
    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.phrases.len()).sum()
    }
}
