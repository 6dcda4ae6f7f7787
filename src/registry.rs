//! The fixed table of accepted models and the validation of incoming chat bodies against it.
//!
//! The first entry of the table is the default model, used only when a request omits the
//! `model` field entirely. A `model` that is present but not an exact match (including `null`)
//! is rejected rather than defaulted.
use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::models::ChatRequest;

/// Which outbound caller serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamKind {
    /// Token-limited chat completions service, authenticated with a bearer key.
    Completions,
    /// Prompt-based chat service, called without credentials.
    Prompt,
}

const MODEL_ROUTES: [(&str, UpstreamKind); 3] = [
    ("deepseek-r1", UpstreamKind::Completions),
    ("gpt-4o", UpstreamKind::Completions),
    ("claude", UpstreamKind::Prompt),
];

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    routes: Vec<(String, UpstreamKind)>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            routes: MODEL_ROUTES
                .iter()
                .map(|(model, kind)| (model.to_string(), *kind))
                .collect(),
        }
    }
}

impl ModelRegistry {
    pub fn default_model(&self) -> &str {
        &self.routes[0].0
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(model, _)| model.as_str())
    }

    pub fn upstream_for(&self, model: &str) -> Option<UpstreamKind> {
        self.routes
            .iter()
            .find(|(candidate, _)| candidate == model)
            .map(|(_, kind)| *kind)
    }

    /// Validate a raw request body into a [`ChatRequest`].
    ///
    /// Checks run in order: body present, prompt present, model allowed.
    pub fn validate(&self, body: &[u8]) -> Result<ChatRequest, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::NoData);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

        let object = match value {
            value if is_empty_value(&value) => return Err(ValidationError::NoData),
            Value::Object(object) => object,
            _ => return Err(ValidationError::NotAnObject),
        };

        let prompt = extract_prompt(&object)?;

        let model = match object.get("model") {
            None => self.default_model().to_owned(),
            Some(Value::String(model)) if self.upstream_for(model).is_some() => model.clone(),
            Some(_) => {
                return Err(ValidationError::InvalidModel {
                    allowed: self.models().map(str::to_owned).collect(),
                });
            }
        };

        Ok(ChatRequest { prompt, model })
    }
}

/// `null`, `false`, zero, and empty strings, arrays or objects carry no data.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn extract_prompt(object: &Map<String, Value>) -> Result<String, ValidationError> {
    match object.get("prompt") {
        None => Err(ValidationError::PromptRequired),
        Some(value) if is_empty_value(value) => Err(ValidationError::PromptRequired),
        Some(Value::String(prompt)) => Ok(prompt.clone()),
        Some(_) => Err(ValidationError::PromptNotString),
    }
}
