use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::ErrorBody;

/// Reasons a chat request is rejected before any upstream is contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No data provided")]
    NoData,
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Prompt is required")]
    PromptRequired,
    #[error("Prompt must be a string")]
    PromptNotString,
    #[error("Invalid model. Choose from: {}", .allowed.join(", "))]
    InvalidModel { allowed: Vec<String> },
}

/// Failure of a single upstream call. The message is relayed to the caller verbatim.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(String),
    #[error("{} for url: {url}", status_line(.status))]
    Status { status: StatusCode, url: String },
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
    #[error("Failed to build upstream request: {0}")]
    Request(String),
}

fn status_line(status: &StatusCode) -> String {
    let kind = if status.is_client_error() {
        "Client"
    } else if status.is_server_error() {
        "Server"
    } else {
        "Unexpected"
    };
    format!(
        "{} {kind} Error: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
