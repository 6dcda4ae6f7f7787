/// Wire types for the gateway's own API and for the two upstream services.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated chat request. Only produced by [`crate::registry::ModelRegistry::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub prompt: String,
    pub model: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".into(),
        }
    }
}

/// Request body for the token-limited chat completions service.
#[derive(Serialize, Debug)]
pub(crate) struct CompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: [CompletionMessage<'a>; 1],
    pub(crate) max_tokens: u32,
}

#[derive(Serialize, Debug)]
pub(crate) struct CompletionMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

/// The subset of a chat completions response the gateway reads.
#[derive(Deserialize, Debug)]
pub(crate) struct CompletionResponse {
    pub(crate) choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CompletionChoice {
    pub(crate) message: CompletionChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CompletionChoiceMessage {
    pub(crate) content: String,
}

/// Request body for the prompt-based chat service.
#[derive(Serialize, Debug)]
pub(crate) struct PromptRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) prompt: &'a str,
    pub(crate) stream: bool,
}

#[derive(Deserialize, Debug)]
pub(crate) struct PromptResponse {
    #[serde(default)]
    pub(crate) text: Option<Value>,
}
