//! Fuzzy intent classification for short chat messages.
//!
//! A message is scored against every synonym of every intent in an ordered
//! [`IntentTable`]; the best intent is accepted if its score reaches the
//! confidence threshold, and mapped to a canned reply by a [`ResponseTable`].
//!
//! # Architecture
//!
//! - `IntentClassifier` trait: common interface for classifiers
//! - `FuzzyIntentClassifier`: fuzzy synonym matching over an `IntentTable`
//! - `IntentTable`: ordered intent → phrases mapping
//! - `ResponseTable`: intent → reply mapping with a fallback
//!
//! # Example
//!
//! ```
//! use tradechat::intent::{self, IntentClassifier, IntentId};
//!
//! # fn main() -> tradechat::error::Result<()> {
//! let classifier = intent::new_builtin(75)?;
//!
//! let result = classifier.classify("show me the markplace");
//! assert_eq!(result.intent, Some(IntentId::from("NAV_MARKETPLACE")));
//! # Ok(())
//! # }
//! ```

mod classifier;
mod core;
mod response;
mod table;
mod types;

// Public exports
pub use classifier::{
    DEFAULT_CONFIDENCE_THRESHOLD, FuzzyIntentClassifier, IntentClassifier, classify_with,
};
pub use self::core::{classify, load_intent_table, new_builtin};
pub use response::{ResponseEntry, ResponseTable};
pub use table::{IntentEntry, IntentTable};
pub use types::{Classification, IntentId};
