use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use gamescout_agent::{AgentRuntime, InboundMessage};
use gamescout_core::errors::InterfaceError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<InboundMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatError {
    pub error: String,
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/chat", post(chat))
        .with_state(ChatState { runtime })
}

pub async fn chat(
    State(state): State<ChatState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(
                event_name = "chat.request.rejected",
                correlation_id = %correlation_id,
                reason = %rejection.body_text(),
                "chat request body could not be decoded"
            );
            let error = format!("malformed request body: {}", rejection.body_text());
            return respond(StatusCode::BAD_REQUEST, &correlation_id, Json(ChatError { error }));
        }
    };

    info!(
        event_name = "chat.request.received",
        correlation_id = %correlation_id,
        message_count = request.messages.len(),
        "chat request received"
    );

    match state.runtime.handle_chat(request.messages, &correlation_id).await {
        Ok(reply) => respond(StatusCode::OK, &correlation_id, Json(reply)),
        Err(error) => {
            let interface = error.into_interface(correlation_id.clone());
            let (status, message) = match &interface {
                InterfaceError::BadRequest { message, .. } => {
                    (StatusCode::BAD_REQUEST, message.clone())
                }
                InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, interface.user_message().to_string())
                }
            };
            warn!(
                event_name = "chat.request.failed",
                correlation_id = %correlation_id,
                status = status.as_u16(),
                error = %interface,
                "chat request failed"
            );
            respond(status, &correlation_id, Json(ChatError { error: message }))
        }
    }
}

/// Reuses a caller-supplied id when it is a valid UUID.
fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
        .to_string()
}

fn respond(status: StatusCode, correlation_id: &str, body: impl IntoResponse) -> Response {
    (status, [(CORRELATION_HEADER, correlation_id.to_string())], body).into_response()
}
