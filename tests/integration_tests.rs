//! Integration tests for the chat gateway
//!
//! These run the real router and the real pooled hyper client against fake upstream servers
//! bound to ephemeral local ports.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use axum_test::TestServer;
use promptgate::client::create_hyper_client;
use promptgate::config::UpstreamConfig;
use promptgate::{AppState, build_router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Recorded {
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeUpstream {
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

fn record(fake: &FakeUpstream, headers: &HeaderMap, body: Value) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    fake.calls.lock().unwrap().push(Recorded { authorization, body });
}

async fn completions_ok(
    State(fake): State<FakeUpstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let reply = format!("echo: {}", body["messages"][0]["content"].as_str().unwrap_or(""));
    record(&fake, &headers, body);
    Json(json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": reply}}]}))
}

async fn prompt_without_text(
    State(fake): State<FakeUpstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&fake, &headers, body);
    Json(json!({"id": "resp-1"}))
}

async fn always_500(
    State(fake): State<FakeUpstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&fake, &headers, body);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Serve a fake upstream on an ephemeral port and return its address.
async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn gateway(completions: SocketAddr, prompt: SocketAddr, api_key: Option<&str>) -> TestServer {
    let upstream = UpstreamConfig::builder()
        .completions_url(format!("http://{completions}/v1/chat/completions").parse().unwrap())
        .prompt_url(format!("http://{prompt}/chat").parse().unwrap())
        .maybe_api_key(api_key.map(str::to_owned))
        .build();
    let app_state = AppState::with_client(&upstream, create_hyper_client(10, 30));
    TestServer::new(build_router(app_state)).unwrap()
}

#[tokio::test]
async fn test_end_to_end_routing_to_both_upstreams() {
    let completions = FakeUpstream::default();
    let prompt = FakeUpstream::default();
    let completions_addr = spawn_upstream(
        Router::new()
            .route("/v1/chat/completions", post(completions_ok))
            .with_state(completions.clone()),
    )
    .await;
    let prompt_addr = spawn_upstream(
        Router::new()
            .route("/chat", post(prompt_without_text))
            .with_state(prompt.clone()),
    )
    .await;

    let server = gateway(completions_addr, prompt_addr, Some("sk-live"));

    let response = server
        .post("/api/chat")
        .json(&json!({"prompt": "hello", "model": "gpt-4o"}))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({"response": "echo: hello"}));

    let response = server
        .post("/api/chat")
        .json(&json!({"prompt": "hello", "model": "claude"}))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({"response": "No response"}));

    let completions_calls = completions.calls();
    assert_eq!(completions_calls.len(), 1);
    assert_eq!(completions_calls[0].authorization.as_deref(), Some("Bearer sk-live"));
    assert_eq!(completions_calls[0].body["model"], "gpt-4o");
    assert_eq!(completions_calls[0].body["max_tokens"], 50);

    let prompt_calls = prompt.calls();
    assert_eq!(prompt_calls.len(), 1);
    assert_eq!(prompt_calls[0].authorization, None);
    assert_eq!(
        prompt_calls[0].body,
        json!({"model": "claude", "prompt": "hello", "stream": false})
    );
}

#[tokio::test]
async fn test_upstream_failure_does_not_take_down_gateway() {
    let failing = FakeUpstream::default();
    let failing_addr = spawn_upstream(
        Router::new()
            .route("/v1/chat/completions", post(always_500))
            .with_state(failing.clone()),
    )
    .await;

    let server = gateway(failing_addr, failing_addr, Some("sk-live"));

    let response = server.post("/api/chat").json(&json!({"prompt": "hello"})).await;
    assert_eq!(response.status_code(), 500);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": format!(
            "500 Server Error: Internal Server Error for url: http://{failing_addr}/v1/chat/completions"
        )})
    );
    assert_eq!(failing.calls()[0].body["model"], "deepseek-r1");

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_unreachable_upstream_reports_transport_error() {
    // Bind then drop a listener to get a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let server = gateway(dead_addr, dead_addr, None);

    let response = server
        .post("/api/chat")
        .json(&json!({"prompt": "hello", "model": "claude"}))
        .await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert!(!body["error"].as_str().unwrap().is_empty());
}
