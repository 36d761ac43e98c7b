//! Integration tests for the HTTP routes

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use tradechat::config::ServerConfig;
use tradechat::server::{AppState, create_router};

fn app(config: &ServerConfig) -> Router {
    let state = AppState::from_config(config).unwrap();
    create_router(state, &config.allowed_origins).unwrap()
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_classifies_message() {
    let app = app(&ServerConfig::default());

    let response = app
        .oneshot(chat_request(r#"{"message": "show me the markplace"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Opening the Wholesale Marketplace...");
    assert_eq!(body["action"], "marketplace");
    assert_eq!(body["debug"]["intent"], "NAV_MARKETPLACE");
    assert_eq!(body["debug"]["confidence"], 90);
    assert_eq!(body["debug"]["request_id"].as_str().unwrap().len(), 20);
}

#[tokio::test]
async fn test_chat_fallback_reply() {
    let app = app(&ServerConfig::default());

    let response = app
        .oneshot(chat_request(r#"{"message": "asdkjasdkj"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body["message"],
        "I'm not sure about that. Contact admin for advanced queries."
    );
    assert_eq!(body["action"], Value::Null);
    assert_eq!(body["debug"]["intent"], Value::Null);
    assert_eq!(body["debug"]["confidence"], 50);
}

#[tokio::test]
async fn test_chat_markup_only_message() {
    let app = app(&ServerConfig::default());

    let response = app
        .oneshot(chat_request(r#"{"message": "<p></p>"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Please enter a valid message.");
    assert!(body.get("debug").is_none());
}

#[tokio::test]
async fn test_chat_rejects_bad_requests() {
    let app = app(&ServerConfig::default());

    let cases = [
        (r#"{"message": ""}"#, "Message cannot be empty"),
        (r#"{"text": "hello"}"#, "Missing 'message' field"),
        (r#"{"message": 42}"#, "Message must be a string"),
        (r#"["hello"]"#, "Invalid request format"),
        (r#"{"message": "#, "Invalid JSON format"),
    ];

    for (payload, expected) in cases {
        let response = app.clone().oneshot(chat_request(payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(json_body(response).await["error"], expected, "payload: {payload}");
    }

    let long = json!({ "message": "a".repeat(501) }).to_string();
    let response = app.clone().oneshot(chat_request(&long)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Message exceeds 500 characters"
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Content-Type must be application/json"
    );
}

#[tokio::test]
async fn test_chat_rate_limited() {
    let mut config = ServerConfig::default();
    config.rate_limit.max_requests = 2;
    let app = app(&config);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(chat_request(r#"{"message": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Rate limit exceeded. Please wait before sending more messages."
    );
    let retry_after = body["retry_after"].as_u64().unwrap();
    assert!((1..=60).contains(&retry_after));

    let status = app
        .oneshot(
            Request::builder()
                .uri("/chat/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(status).await;
    assert_eq!(body["requests_remaining"], 0);
    assert_eq!(body["limit_per_window"], 2);
}

#[tokio::test]
async fn test_status_for_new_client() {
    let app = app(&ServerConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/chat/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({ "requests_remaining": 30, "limit_per_window": 30, "window_seconds": 60 })
    );
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = app(&ServerConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert_eq!(
        headers["cache-control"],
        "no-store, no-cache, must-revalidate"
    );

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tradechat");
    assert_eq!(body["version"], tradechat::VERSION);
}

#[tokio::test]
async fn test_cors_origins() {
    let app = app(&ServerConfig::default());

    let allowed = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );

    let denied = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(denied).await.unwrap();
    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/chat")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
