//! Command line argument parsing for Tradechat CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::util::fuzzy::ScorerKind;

/// Tradechat - fuzzy intent matching chat backend
#[derive(Parser, Debug, Clone)]
#[command(name = "tradechat")]
#[command(about = "Fuzzy intent classification and rate-limited chat service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TradechatArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TradechatArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP chat service
    Serve(ServeArgs),

    /// Classify a single message
    Classify(ClassifyArgs),

    /// Score a query against a candidate phrase
    Score(ScoreArgs),

    /// List the intent table
    Intents(TableArgs),

    /// Load and validate configuration and tables
    #[command(name = "check-config")]
    CheckConfig(ServeArgs),
}

/// Intent and response table locations
#[derive(Parser, Debug, Clone, Default)]
pub struct TableArgs {
    /// Intent table file (JSON)
    #[arg(long, value_name = "FILE", env = "TRADECHAT_INTENTS")]
    pub intents: Option<PathBuf>,

    /// Response table file (JSON)
    #[arg(long, value_name = "FILE", env = "TRADECHAT_RESPONSES")]
    pub responses: Option<PathBuf>,
}

/// Arguments for running the service
#[derive(Parser, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "TRADECHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TRADECHAT_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "TRADECHAT_PORT")]
    pub port: Option<u16>,

    /// Minimum confidence for accepting an intent (0-100)
    #[arg(short, long, env = "TRADECHAT_THRESHOLD", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Requests allowed per client per window
    #[arg(long, env = "TRADECHAT_RATE_LIMIT")]
    pub rate_limit: Option<usize>,

    /// Rate limit window in seconds
    #[arg(long, env = "TRADECHAT_RATE_WINDOW")]
    pub rate_window: Option<u64>,

    #[command(flatten)]
    pub tables: TableArgs,
}

/// Arguments for classifying a message
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Message text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Minimum confidence for accepting an intent (0-100)
    #[arg(short, long, default_value = "75", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,

    /// Similarity function
    #[arg(short, long, default_value = "partial")]
    pub scorer: ScorerChoice,

    #[command(flatten)]
    pub tables: TableArgs,
}

/// Arguments for scoring two strings
#[derive(Parser, Debug, Clone)]
pub struct ScoreArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Candidate phrase
    #[arg(value_name = "CANDIDATE")]
    pub candidate: String,

    /// Similarity function
    #[arg(short, long, default_value = "partial")]
    pub scorer: ScorerChoice,
}

/// Similarity functions available in CLI
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerChoice {
    /// Best window of the longer string
    Partial,
    /// Whole strings
    Ratio,
}

impl From<ScorerChoice> for ScorerKind {
    fn from(choice: ScorerChoice) -> Self {
        match choice {
            ScorerChoice::Partial => ScorerKind::Partial,
            ScorerChoice::Ratio => ScorerKind::Ratio,
        }
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
