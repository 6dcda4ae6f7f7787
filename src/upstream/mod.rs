//! Outbound callers and the dispatcher that picks one per request.
//!
//! Each upstream service is an [`Upstream`] implementation. The [`Dispatcher`] owns one
//! instance per [`UpstreamKind`] and looks the right one up through the [`ModelRegistry`],
//! so adding a model is a table entry rather than a new branch.
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, header};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

use crate::client::HttpClient;
use crate::config::UpstreamConfig;
use crate::errors::{GatewayError, UpstreamError};
use crate::models::ChatRequest;
use crate::registry::{ModelRegistry, UpstreamKind};

pub mod completions;
pub mod prompt;

pub use completions::CompletionsUpstream;
pub use prompt::PromptUpstream;

#[async_trait]
pub trait Upstream: std::fmt::Debug + Send + Sync {
    /// Perform one call to the upstream service and return the reply text.
    async fn send(&self, prompt: &str, model: &str) -> Result<String, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ModelRegistry,
    upstreams: HashMap<UpstreamKind, Arc<dyn Upstream>>,
}

impl Dispatcher {
    /// Build the production dispatcher: both callers share the given HTTP client.
    pub fn new<T>(registry: ModelRegistry, config: &UpstreamConfig, http_client: T) -> Self
    where
        T: HttpClient + Clone + Send + Sync + 'static,
    {
        let completions = CompletionsUpstream::new(
            http_client.clone(),
            config.completions_url.clone(),
            config.api_key.clone(),
        );
        let prompt = PromptUpstream::new(http_client, config.prompt_url.clone());

        Self::with_upstreams(
            registry,
            [
                (
                    UpstreamKind::Completions,
                    Arc::new(completions) as Arc<dyn Upstream>,
                ),
                (UpstreamKind::Prompt, Arc::new(prompt) as Arc<dyn Upstream>),
            ],
        )
    }

    /// Build a dispatcher from explicit upstream implementations.
    pub fn with_upstreams(
        registry: ModelRegistry,
        upstreams: impl IntoIterator<Item = (UpstreamKind, Arc<dyn Upstream>)>,
    ) -> Self {
        Self {
            registry,
            upstreams: upstreams.into_iter().collect(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Invoke exactly one upstream for a validated request.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let kind = self.registry.upstream_for(&request.model).ok_or_else(|| {
            GatewayError::Internal(format!("No upstream mapped for model '{}'", request.model))
        })?;
        let upstream = self.upstreams.get(&kind).ok_or_else(|| {
            GatewayError::Internal(format!("Upstream {kind:?} is not configured"))
        })?;

        debug!(?kind, "Dispatching request");
        Ok(upstream.send(&request.prompt, &request.model).await?)
    }
}

/// POST a JSON body and return the raw bytes of a 2xx response.
pub(crate) async fn post_json<T, B>(
    client: &T,
    url: &Url,
    bearer: Option<&str>,
    body: &B,
) -> Result<Bytes, UpstreamError>
where
    T: HttpClient + Send + Sync,
    B: Serialize,
{
    let payload = serde_json::to_vec(body).map_err(|e| UpstreamError::Request(e.to_string()))?;

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(url.as_str())
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = builder
        .body(Body::from(payload))
        .map_err(|e| UpstreamError::Request(e.to_string()))?;

    let response = client
        .request(req)
        .await
        .map_err(|e| UpstreamError::Transport(describe(&*e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status,
            url: url.to_string(),
        });
    }

    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| UpstreamError::Transport(describe(&e)))
}

/// Render an error together with its chain of sources.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
