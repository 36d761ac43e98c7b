//! Fuzzy intent classifier.

use std::sync::Arc;

use crate::error::{Result, TradechatError};
use crate::intent::table::IntentTable;
use crate::intent::types::{Classification, IntentId};
use crate::util::fuzzy::Scorer;

/// Default minimum score for accepting an intent.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 75;

/// Intent classifier trait.
///
/// Implementations are pure: the same text always yields the same
/// classification, so they can be shared freely across request handlers.
pub trait IntentClassifier: Send + Sync {
    /// Classify a sanitized message.
    fn classify(&self, text: &str) -> Classification;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// Classifies messages by fuzzy matching them against an [`IntentTable`].
///
/// Each intent scores as its best-matching phrase. The intent with the
/// strictly highest score wins, so on a tie the one listed first in the table
/// is kept. It is accepted only if that score reaches the threshold.
#[derive(Debug, Clone)]
pub struct FuzzyIntentClassifier {
    table: Arc<IntentTable>,
    scorer: Arc<dyn Scorer>,
    threshold: u8,
}

impl FuzzyIntentClassifier {
    /// Create a classifier. Fails if `threshold` is above 100.
    pub fn new(table: Arc<IntentTable>, scorer: Arc<dyn Scorer>, threshold: u8) -> Result<Self> {
        if threshold > 100 {
            return Err(TradechatError::config(format!(
                "confidence threshold must be within 0..=100, got {threshold}"
            )));
        }

        Ok(Self {
            table,
            scorer,
            threshold,
        })
    }

    /// The table this classifier matches against.
    pub fn table(&self) -> &IntentTable {
        &self.table
    }

    /// Minimum accepted score.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Name of the underlying scorer.
    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }
}

impl IntentClassifier for FuzzyIntentClassifier {
    fn classify(&self, text: &str) -> Classification {
        classify_with(text, &self.table, self.scorer.as_ref(), self.threshold)
    }

    fn name(&self) -> &str {
        "fuzzy"
    }
}

/// Classify `text` against `table` with an explicit scorer.
pub fn classify_with(
    text: &str,
    table: &IntentTable,
    scorer: &dyn Scorer,
    threshold: u8,
) -> Classification {
    if text.is_empty() {
        return Classification::unknown();
    }

    let text = text.to_lowercase();

    let mut best_intent: Option<&IntentId> = None;
    let mut best_phrase: Option<&str> = None;
    let mut best_score = 0u8;

    for entry in table.iter() {
        let mut intent_score = 0u8;
        let mut intent_phrase: Option<&str> = None;

        for phrase in &entry.phrases {
            let score = scorer.score(&text, phrase);
            if intent_phrase.is_none() || score > intent_score {
                intent_score = score;
                intent_phrase = Some(phrase.as_str());
            }
        }

        // Strictly greater: an equal score later in the table never displaces the current best
        if intent_score > best_score {
            best_score = intent_score;
            best_intent = Some(&entry.intent);
            best_phrase = intent_phrase;
        }
    }

    Classification {
        intent: best_intent
            .filter(|_| best_score >= threshold)
            .cloned(),
        confidence: best_score,
        matched_phrase: best_phrase.map(str::to_string),
    }
}
