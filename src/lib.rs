//! promptgate - a small chat gateway
//!
//! Accepts a prompt and a model name on `POST /api/chat`, forwards it to the upstream
//! service that serves the model, and relays the reply or the upstream error back.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info, instrument};

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod upstream;

use client::HttpClient;
use config::{Config, UpstreamConfig};
use errors::GatewayError;
use registry::ModelRegistry;
use upstream::Dispatcher;

/// Shared, read-only state handed to every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Create a new AppState backed by the pooled hyper client
    pub fn new(config: &Config) -> Self {
        let http_client =
            client::create_hyper_client(config.pool_max_idle_per_host, config.pool_idle_timeout_secs);
        Self::with_client(&config.upstream(), http_client)
    }

    /// Create a new AppState with a custom HTTP client (useful for testing)
    pub fn with_client<T>(upstream: &UpstreamConfig, http_client: T) -> Self
    where
        T: HttpClient + Clone + Send + Sync + 'static,
    {
        Self::with_dispatcher(Dispatcher::new(
            ModelRegistry::default(),
            upstream,
            http_client,
        ))
    }

    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Build the main router for the gateway
/// This creates routes for:
/// - `/health` - Liveness check, never touches an upstream
/// - `/api/chat` - Validates and forwards a prompt
///
/// Request bodies are unbounded, so large prompts reach the upstream instead of being cut off
/// with a 413. Panics inside a handler are turned into a 500 response instead of dropping the
/// connection.
#[instrument(skip(state))]
pub fn build_router(state: AppState) -> Router {
    info!("Building router");
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };
    error!(panic = %message, "Request handler panicked");

    GatewayError::Internal(message).into_response()
}
