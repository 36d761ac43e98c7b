//! Chat request handling: validate, sanitize, classify, respond.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::intent::{
    Classification, FuzzyIntentClassifier, IntentClassifier, IntentId, IntentTable, ResponseTable,
};
use crate::pipeline::sanitize::{RequestError, Sanitizer};

const INVALID_MESSAGE_REPLY: &str = "Please enter a valid message.";

/// Diagnostics attached to a classified reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDebug {
    /// Accepted intent, if any.
    pub intent: Option<IntentId>,
    /// Best score observed.
    pub confidence: u8,
    /// Identifier of the request, for correlating logs.
    pub request_id: String,
}

/// Reply returned to the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Message shown to the user.
    pub message: String,
    /// Navigation hint for the client.
    pub action: Option<String>,
    /// Classification diagnostics; absent when nothing was classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ChatDebug>,
}

/// Turns chat requests into replies.
///
/// Holds only immutable state, so one instance is shared by every handler.
#[derive(Clone)]
pub struct ChatService {
    classifier: Arc<dyn IntentClassifier>,
    responses: Arc<ResponseTable>,
    sanitizer: Sanitizer,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("classifier", &self.classifier.name())
            .field("responses", &self.responses.len())
            .field("sanitizer", &self.sanitizer)
            .finish()
    }
}

impl ChatService {
    /// Create a service from its parts.
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        responses: Arc<ResponseTable>,
        max_message_length: usize,
    ) -> Result<Self> {
        Ok(Self {
            classifier,
            responses,
            sanitizer: Sanitizer::new(max_message_length)?,
        })
    }

    /// Load tables and build the classifier described by `config`.
    pub fn from_config(config: &ClassifierConfig, max_message_length: usize) -> Result<Self> {
        let table = match &config.intents_path {
            Some(path) => IntentTable::load_from_file(path)?,
            None => IntentTable::builtin()?,
        };
        let responses = match &config.responses_path {
            Some(path) => ResponseTable::load_from_file(path)?,
            None => ResponseTable::builtin()?,
        };
        responses.validate_against(&table)?;

        info!(
            "Loaded {} intents ({} phrases) and {} responses",
            table.len(),
            table.phrase_count(),
            responses.len()
        );

        let classifier =
            FuzzyIntentClassifier::new(Arc::new(table), config.scorer.build(), config.threshold)?;

        Self::new(Arc::new(classifier), Arc::new(responses), max_message_length)
    }

    /// Handle a parsed request body.
    pub fn handle(&self, body: &Value) -> std::result::Result<ChatReply, RequestError> {
        let request_id = new_request_id();

        let message = self.sanitizer.validate(body).inspect_err(|e| {
            warn!("[{request_id}] Validation failed: {e}");
        })?;

        Ok(self.reply_with_id(message, request_id))
    }

    /// Reply to a raw message.
    pub fn reply(&self, message: &str) -> ChatReply {
        self.reply_with_id(message, new_request_id())
    }

    fn reply_with_id(&self, message: &str, request_id: String) -> ChatReply {
        let text = self.sanitizer.sanitize(message);
        if text.is_empty() {
            warn!("[{request_id}] Empty message after sanitization");
            return ChatReply {
                message: INVALID_MESSAGE_REPLY.to_string(),
                action: None,
                debug: None,
            };
        }

        let preview: String = text.chars().take(50).collect();
        info!("[{request_id}] Processing: '{preview}'");

        let Classification {
            intent, confidence, ..
        } = self.classifier.classify(&text);
        info!(
            "[{request_id}] Intent: {}, Confidence: {confidence}",
            intent.as_ref().map_or("none", IntentId::as_str)
        );

        let response = self.responses.respond(intent.as_ref());

        ChatReply {
            message: response.message.clone(),
            action: response.action.clone(),
            debug: Some(ChatDebug {
                intent,
                confidence,
                request_id,
            }),
        }
    }

    /// Classify a message after sanitizing it.
    pub fn classify(&self, message: &str) -> Classification {
        self.classifier.classify(&self.sanitizer.sanitize(message))
    }

    /// The response table.
    pub fn responses(&self) -> &ResponseTable {
        &self.responses
    }
}

fn new_request_id() -> String {
    Utc::now().format("%Y%m%d%H%M%S%6f").to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::pipeline::sanitize::DEFAULT_MAX_MESSAGE_LENGTH;

    fn service() -> ChatService {
        ChatService::from_config(&ClassifierConfig::default(), DEFAULT_MAX_MESSAGE_LENGTH).unwrap()
    }

    #[test]
    fn test_reply_with_intent() {
        let reply = service().handle(&json!({"message": "Where can I login?"})).unwrap();

        assert_eq!(reply.message, "Redirecting to Partner Login...");
        assert_eq!(reply.action.as_deref(), Some("login"));

        let debug = reply.debug.unwrap();
        assert_eq!(debug.intent, Some(IntentId::from("NAV_LOGIN")));
        assert_eq!(debug.confidence, 100);
        assert_eq!(debug.request_id.len(), 20);
    }

    #[test]
    fn test_fallback_reply() {
        let reply = service().reply("asdkjasdkj");

        assert_eq!(
            reply.message,
            "I'm not sure about that. Contact admin for advanced queries."
        );
        assert_eq!(reply.action, None);

        let debug = reply.debug.unwrap();
        assert_eq!(debug.intent, None);
        assert!(debug.confidence < 75);
    }

    #[test]
    fn test_empty_after_sanitization() {
        let reply = service().handle(&json!({"message": "<p></p>"})).unwrap();

        assert_eq!(reply.message, "Please enter a valid message.");
        assert_eq!(reply.debug, None);
    }

    #[test]
    fn test_invalid_request() {
        assert_eq!(
            service().handle(&json!({"message": ""})),
            Err(RequestError::EmptyMessage)
        );
    }

    #[test]
    fn test_reply_serialization_omits_missing_debug() {
        let reply = ChatReply {
            message: "Please enter a valid message.".to_string(),
            action: None,
            debug: None,
        };
        let value = serde_json::to_value(&reply).unwrap();

        assert_eq!(
            value,
            json!({"message": "Please enter a valid message.", "action": null})
        );
    }

    #[test]
    fn test_classify_sanitizes_first() {
        let classification = service().classify("<b>HELLO</b>");
        assert_eq!(classification.intent, Some(IntentId::from("GREETING")));
    }
}
