//! Caller for the prompt-based chat service. This upstream takes no credentials.
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Upstream, post_json};
use crate::client::HttpClient;
use crate::errors::UpstreamError;
use crate::models::{PromptRequest, PromptResponse};

/// Returned when the upstream replies successfully without a `text` field.
pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone)]
pub struct PromptUpstream<T: HttpClient> {
    http_client: T,
    url: Url,
}

impl<T: HttpClient> PromptUpstream<T> {
    pub fn new(http_client: T, url: Url) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl<T: HttpClient + Send + Sync> Upstream for PromptUpstream<T> {
    async fn send(&self, prompt: &str, model: &str) -> Result<String, UpstreamError> {
        let body = PromptRequest {
            model,
            prompt,
            stream: false,
        };

        debug!(url = %self.url, model, "Calling prompt upstream");
        let bytes = post_json(&self.http_client, &self.url, None, &body).await?;

        let parsed: PromptResponse = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        Ok(match parsed.text {
            None | Some(Value::Null) => NO_RESPONSE.to_string(),
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
        })
    }
}
