//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TradechatArgs};
use crate::error::Result;

/// Result structure for message classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub text: String,
    pub intent: Option<String>,
    pub confidence: u8,
    pub threshold: u8,
    pub matched_phrase: Option<String>,
    pub message: String,
    pub action: Option<String>,
}

/// Result structure for scoring two strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scorer: String,
    pub query: String,
    pub candidate: String,
    pub score: u8,
}

/// One row of the intent listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct IntentSummary {
    pub intent: String,
    pub phrases: Vec<String>,
    pub action: Option<String>,
}

/// Result structure for the intent listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct IntentListing {
    pub intents: Vec<IntentSummary>,
    pub total_phrases: usize,
}

/// Summary of a validated configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub bind_address: String,
    pub threshold: u8,
    pub scorer: String,
    pub intents: usize,
    pub phrases: usize,
    pub responses: usize,
    pub max_requests: usize,
    pub window_secs: u64,
    pub allowed_origins: Vec<String>,
}

/// Output a result in the requested format.
pub fn output_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &TradechatArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
            }
            result.print_human(args.verbosity());
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

/// Trait for types that can be displayed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self, verbosity: u8);
}

impl HumanReadable for ClassificationResult {
    fn print_human(&self, verbosity: u8) {
        println!(
            "Intent: {}",
            self.intent.as_deref().unwrap_or("(none)")
        );
        println!("Confidence: {} (threshold {})", self.confidence, self.threshold);
        if verbosity > 1 {
            if let Some(phrase) = &self.matched_phrase {
                println!("Matched phrase: {phrase}");
            }
        }
        println!("Reply: {}", self.message);
        if let Some(action) = &self.action {
            println!("Action: {action}");
        }
    }
}

impl HumanReadable for ScoreResult {
    fn print_human(&self, verbosity: u8) {
        if verbosity > 1 {
            println!("Scorer: {}", self.scorer);
            println!("Query: {}", self.query);
            println!("Candidate: {}", self.candidate);
        }
        println!("Score: {}", self.score);
    }
}

impl HumanReadable for IntentListing {
    fn print_human(&self, verbosity: u8) {
        for summary in &self.intents {
            match &summary.action {
                Some(action) => println!(
                    "{} ({} phrases) -> {action}",
                    summary.intent,
                    summary.phrases.len()
                ),
                None => println!("{} ({} phrases)", summary.intent, summary.phrases.len()),
            }
            if verbosity > 1 {
                for phrase in &summary.phrases {
                    println!("    {phrase}");
                }
            }
        }
        println!(
            "Total: {} intents, {} phrases",
            self.intents.len(),
            self.total_phrases
        );
    }
}

impl HumanReadable for ConfigSummary {
    fn print_human(&self, verbosity: u8) {
        println!("Bind address: {}", self.bind_address);
        println!("Threshold: {} ({} scorer)", self.threshold, self.scorer);
        println!(
            "Knowledge base: {} intents, {} phrases, {} responses",
            self.intents, self.phrases, self.responses
        );
        println!(
            "Rate limit: {} requests per {}s",
            self.max_requests, self.window_secs
        );
        if verbosity > 1 {
            println!("Allowed origins:");
            for origin in &self.allowed_origins {
                println!("    {origin}");
            }
        }
    }
}
