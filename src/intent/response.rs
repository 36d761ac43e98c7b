//! Canned responses keyed by intent.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TradechatError};
use crate::intent::table::IntentTable;
use crate::intent::types::IntentId;

const BUILTIN_RESPONSES: &str = include_str!("../../resources/responses.json");

/// Reply text and an optional client-side action (e.g. `"login"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// Message shown to the user.
    pub message: String,
    /// Navigation hint for the client.
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseFile {
    responses: Vec<IntentResponse>,
    fallback: ResponseEntry,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    intent: IntentId,
    message: String,
    action: Option<String>,
}

/// Maps intents to responses, with a fallback for unrecognized messages.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    responses: AHashMap<IntentId, ResponseEntry>,
    fallback: ResponseEntry,
}

impl ResponseTable {
    /// Create a response table. Fails on repeated intents.
    pub fn new(
        responses: impl IntoIterator<Item = (IntentId, ResponseEntry)>,
        fallback: ResponseEntry,
    ) -> Result<Self> {
        let mut map = AHashMap::new();
        for (intent, entry) in responses {
            if map.insert(intent.clone(), entry).is_some() {
                return Err(TradechatError::table(format!(
                    "duplicate response for intent '{intent}'"
                )));
            }
        }

        Ok(Self {
            responses: map,
            fallback,
        })
    }

    /// The responses compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_RESPONSES)
    }

    /// Parse a `{ "responses": [...], "fallback": {...} }` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ResponseFile = serde_json::from_str(json)
            .map_err(|e| TradechatError::parse(format!("Failed to parse response table: {e}")))?;

        Self::new(
            file.responses.into_iter().map(|r| {
                (
                    r.intent,
                    ResponseEntry {
                        message: r.message,
                        action: r.action,
                    },
                )
            }),
            file.fallback,
        )
    }

    /// Load a response table from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TradechatError::table(format!(
                "Failed to read response table '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Check that every response belongs to an intent of `table`.
    pub fn validate_against(&self, table: &IntentTable) -> Result<()> {
        let mut unknown: Vec<&str> = self
            .responses
            .keys()
            .filter(|intent| !table.contains(intent))
            .map(IntentId::as_str)
            .collect();

        if unknown.is_empty() {
            return Ok(());
        }

        unknown.sort_unstable();
        Err(TradechatError::table(format!(
            "responses defined for unknown intents: {}",
            unknown.join(", ")
        )))
    }

    /// Response for a classified intent; the fallback when there is none.
    pub fn respond(&self, intent: Option<&IntentId>) -> &ResponseEntry {
        intent
            .and_then(|intent| self.responses.get(intent))
            .unwrap_or(&self.fallback)
    }

    /// The fallback response.
    pub fn fallback(&self) -> &ResponseEntry {
        &self.fallback
    }

    /// Number of intent responses, excluding the fallback.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether only the fallback is defined.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
