//! Caller for the token-limited chat completions service.
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{Upstream, post_json};
use crate::client::HttpClient;
use crate::errors::UpstreamError;
use crate::models::{CompletionMessage, CompletionRequest, CompletionResponse};

/// Upper bound on generated tokens for every completion.
pub const MAX_TOKENS: u32 = 50;

#[derive(Debug, Clone)]
pub struct CompletionsUpstream<T: HttpClient> {
    http_client: T,
    url: Url,
    api_key: Option<String>,
}

impl<T: HttpClient> CompletionsUpstream<T> {
    pub fn new(http_client: T, url: Url, api_key: Option<String>) -> Self {
        Self {
            http_client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl<T: HttpClient + Send + Sync> Upstream for CompletionsUpstream<T> {
    async fn send(&self, prompt: &str, model: &str) -> Result<String, UpstreamError> {
        let body = CompletionRequest {
            model,
            messages: [CompletionMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
        };

        debug!(url = %self.url, model, "Calling completions upstream");
        // An unset key still sends the header, with an empty token.
        let token = self.api_key.as_deref().unwrap_or_default();
        let bytes = post_json(&self.http_client, &self.url, Some(token), &body).await?;

        let mut parsed: CompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        if parsed.choices.is_empty() {
            return Err(UpstreamError::Malformed(
                "response contained no choices".into(),
            ));
        }
        Ok(parsed.choices.swap_remove(0).message.content)
    }
}
