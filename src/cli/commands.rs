//! Command implementations for Tradechat CLI.

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{ClassifierConfig, ServerConfig};
use crate::error::{Result, TradechatError};
use crate::intent::{ResponseTable, load_intent_table};
use crate::pipeline::{ChatService, DEFAULT_MAX_MESSAGE_LENGTH};
use crate::server;
use crate::util::fuzzy::{Scorer, ScorerKind};

/// Execute a CLI command.
pub fn execute_command(args: TradechatArgs) -> Result<()> {
    match &args.command {
        Command::Serve(serve_args) => run_server(serve_args.clone()),
        Command::Classify(classify_args) => classify_message(classify_args.clone(), &args),
        Command::Score(score_args) => score_strings(score_args.clone(), &args),
        Command::Intents(table_args) => list_intents(table_args.clone(), &args),
        Command::CheckConfig(serve_args) => check_config(serve_args.clone(), &args),
    }
}

/// Load the configuration file, then apply command-line overrides.
pub fn resolve_config(args: &ServeArgs) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(threshold) = args.threshold {
        config.classifier.threshold = threshold;
    }
    if let Some(max_requests) = args.rate_limit {
        config.rate_limit.max_requests = max_requests;
    }
    if let Some(window_secs) = args.rate_window {
        config.rate_limit.window_secs = window_secs;
    }
    if let Some(path) = &args.tables.intents {
        config.classifier.intents_path = Some(path.clone());
    }
    if let Some(path) = &args.tables.responses {
        config.classifier.responses_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Run the HTTP service until interrupted.
fn run_server(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| TradechatError::server(format!("Failed to start runtime: {e}")))?;

    info!("Starting tradechat {}", crate::VERSION);
    runtime.block_on(server::serve(config))
}

/// Classify one message and show the reply it would get.
fn classify_message(args: ClassifyArgs, cli_args: &TradechatArgs) -> Result<()> {
    let classifier_config = ClassifierConfig {
        threshold: args.threshold,
        scorer: args.scorer.into(),
        intents_path: args.tables.intents.clone(),
        responses_path: args.tables.responses.clone(),
    };
    let service = ChatService::from_config(&classifier_config, DEFAULT_MAX_MESSAGE_LENGTH)?;

    let classification = service.classify(&args.text);
    let reply = service.reply(&args.text);

    output_result(
        "Classification",
        &ClassificationResult {
            text: args.text,
            intent: classification.intent.map(|intent| intent.to_string()),
            confidence: classification.confidence,
            threshold: args.threshold,
            matched_phrase: classification.matched_phrase,
            message: reply.message,
            action: reply.action,
        },
        cli_args,
    )
}

/// Score a query against a single candidate.
fn score_strings(args: ScoreArgs, cli_args: &TradechatArgs) -> Result<()> {
    let scorer = ScorerKind::from(args.scorer).build();
    let score = scorer.score(&args.query, &args.candidate);

    output_result(
        "Similarity",
        &ScoreResult {
            scorer: scorer.name().to_string(),
            query: args.query,
            candidate: args.candidate,
            score,
        },
        cli_args,
    )
}

/// List every intent with its phrases and action.
fn list_intents(args: TableArgs, cli_args: &TradechatArgs) -> Result<()> {
    let table = load_intent_table(args.intents.as_deref())?;
    let responses = match &args.responses {
        Some(path) => ResponseTable::load_from_file(path)?,
        None => ResponseTable::builtin()?,
    };

    let intents = table
        .iter()
        .map(|entry| IntentSummary {
            intent: entry.intent.to_string(),
            phrases: entry.phrases.clone(),
            action: responses.respond(Some(&entry.intent)).action.clone(),
        })
        .collect();

    output_result(
        "Intents",
        &IntentListing {
            intents,
            total_phrases: table.phrase_count(),
        },
        cli_args,
    )
}

/// Load everything the service would load, without binding a socket.
fn check_config(args: ServeArgs, cli_args: &TradechatArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let table = load_intent_table(config.classifier.intents_path.as_deref())?;
    let responses = match &config.classifier.responses_path {
        Some(path) => ResponseTable::load_from_file(path)?,
        None => ResponseTable::builtin()?,
    };
    responses.validate_against(&table)?;

    server::create_router(server::AppState::from_config(&config)?, &config.allowed_origins)?;

    output_result(
        "Configuration is valid",
        &ConfigSummary {
            bind_address: config.bind_address(),
            threshold: config.classifier.threshold,
            scorer: config.classifier.scorer.build().name().to_string(),
            intents: table.len(),
            phrases: table.phrase_count(),
            responses: responses.len(),
            max_requests: config.rate_limit.max_requests,
            window_secs: config.rate_limit.window_secs,
            allowed_origins: config.allowed_origins.clone(),
        },
        cli_args,
    )
}
