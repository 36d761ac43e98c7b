//! HTTP surface of the chat service.
//!
//! - `POST /chat`: classify a message (rate limited per client address)
//! - `GET /chat/status`: remaining quota for the caller
//! - `GET /health`: liveness probe

mod handlers;
mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::ServerConfig;
use crate::error::{Result, TradechatError};
use crate::pipeline::ChatService;
use crate::rate_limit::SlidingWindowLimiter;

pub use handlers::{HealthStatus, RateLimitStatus};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    /// Build the chat service and rate limiter described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            chat: Arc::new(ChatService::from_config(
                &config.classifier,
                config.max_message_length,
            )?),
            limiter: Arc::new(SlidingWindowLimiter::new(&config.rate_limit)?),
        })
    }
}

/// Build the application router.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let cors = middleware::cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/status", get(handlers::rate_limit_status))
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::security_headers))
                .layer(CatchPanicLayer::custom(middleware::handle_panic))
                .layer(axum::middleware::from_fn(middleware::log_request))
                .layer(cors),
        )
        .with_state(state))
}

/// Periodically evict idle clients from the limiter.
pub fn spawn_sweeper(limiter: Arc<SlidingWindowLimiter>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = limiter.sweep();
            if evicted > 0 {
                info!(
                    "Rate limiter sweep evicted {evicted} clients, {} tracked",
                    limiter.tracked_clients()
                );
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the service until interrupted.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let sweeper = spawn_sweeper(state.limiter.clone(), config.rate_limit.sweep_interval());
    let app = create_router(state, &config.allowed_origins)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| TradechatError::server(format!("Failed to bind {address}: {e}")))?;

    info!(
        "Listening on http://{address} (threshold {}, {} requests per {}s)",
        config.classifier.threshold, config.rate_limit.max_requests, config.rate_limit.window_secs
    );

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweeper.abort();
    result.map_err(|e| TradechatError::server(format!("Server error: {e}")))
}
