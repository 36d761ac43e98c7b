//! Helper functions for creating intent classifiers.

use std::sync::Arc;

use crate::error::Result;
use crate::intent::classifier::{FuzzyIntentClassifier, classify_with};
use crate::intent::table::IntentTable;
use crate::intent::types::Classification;
use crate::util::fuzzy::{PartialRatioScorer, ScorerKind};

/// Classify `text` against `table` using partial-ratio scoring.
pub fn classify(text: &str, table: &IntentTable, threshold: u8) -> Classification {
    classify_with(text, table, &PartialRatioScorer, threshold)
}

/// Create a fuzzy classifier over the built-in knowledge base.
pub fn new_builtin(threshold: u8) -> Result<FuzzyIntentClassifier> {
    FuzzyIntentClassifier::new(
        Arc::new(IntentTable::builtin()?),
        ScorerKind::Partial.build(),
        threshold,
    )
}

/// Load an intent table from `path`, or the built-in one when `path` is `None`.
pub fn load_intent_table(path: Option<&std::path::Path>) -> Result<IntentTable> {
    match path {
        Some(path) => IntentTable::load_from_file(path),
        None => IntentTable::builtin(),
    }
}
