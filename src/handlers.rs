/// Axum handlers for the gateway
use crate::AppState;
use crate::errors::GatewayError;
use crate::models::{ChatResponse, HealthResponse};
use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use tracing::{debug, error, info, instrument};

#[instrument]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// Validates the body, forwards the prompt to the upstream mapped to its model, and relays the reply.
///
/// The body is taken as raw bytes so that clients omitting `Content-Type` are still served.
#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, GatewayError> {
    let request = state.dispatcher.registry().validate(&body).map_err(|e| {
        debug!(error = %e, "Rejected chat request");
        GatewayError::from(e)
    })?;

    info!(model = %request.model, prompt_len = request.prompt.len(), "Received chat request");

    match state.dispatcher.dispatch(&request).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            error!(model = %request.model, error = %e, "Upstream call failed");
            Err(e)
        }
    }
}
