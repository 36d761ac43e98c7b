//! Route handlers.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::pipeline::RequestError;
use crate::rate_limit::RateLimitDecision;
use crate::server::AppState;

/// Body of `GET /chat/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub requests_remaining: usize,
    pub limit_per_window: usize,
    pub window_seconds: u64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn client_id(connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    connect_info.map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

fn bad_request(error: RequestError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

fn rejection_error(rejection: &JsonRejection) -> RequestError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => RequestError::UnsupportedContentType,
        _ => RequestError::InvalidJson,
    }
}

/// `POST /chat`: rate limit, then classify the message and reply.
pub async fn chat(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let client = client_id(connect_info.as_ref());

    if let RateLimitDecision::Limited { retry_after } = state.limiter.check(&client) {
        warn!("Rate limit exceeded for client: {client}");
        let retry_after_secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;

        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            Json(json!({
                "error": "Rate limit exceeded. Please wait before sending more messages.",
                "retry_after": retry_after_secs
            })),
        )
            .into_response();
    }

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected chat body from {client}: {rejection}");
            return bad_request(rejection_error(&rejection));
        }
    };

    match state.chat.handle(&body) {
        Ok(reply) => Json(reply).into_response(),
        Err(error) => bad_request(error),
    }
}

/// `GET /chat/status`: remaining quota for the calling client.
pub async fn rate_limit_status(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Json<RateLimitStatus> {
    let client = client_id(connect_info.as_ref());

    Json(RateLimitStatus {
        requests_remaining: state.limiter.remaining(&client),
        limit_per_window: state.limiter.max_requests(),
        window_seconds: state.limiter.window().as_secs(),
    })
}

/// `GET /health`.
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        service: "tradechat".to_string(),
        version: crate::VERSION.to_string(),
    })
}
