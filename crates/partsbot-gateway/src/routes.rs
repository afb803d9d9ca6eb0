use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{error, info, warn};

use partsbot_core::error::{PartsbotError, Result};
use partsbot_core::types::{validate_messages, ChatMessage, SessionId};
use partsbot_dialogue::error_event;

use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

fn parse_chat_request(body: &[u8]) -> Result<Vec<ChatMessage>> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| PartsbotError::Validation(e.to_string()))?;
    validate_messages(&request.messages)?;
    Ok(request.messages)
}

fn session_from(headers: &HeaderMap) -> SessionId {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SessionId::from_string)
        .unwrap_or_default()
}

// POST /api/chat relays the dialogue backend's event stream
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = session_from(&headers);
    match relay_chat(&state, &session, &body).await {
        Ok(response) => response,
        Err(e) => {
            error!(session_id = %session, error = %e, "Chat relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, "text/event-stream"), (CACHE_CONTROL, "no-cache")],
                error_event(&e.to_string()),
            )
                .into_response()
        }
    }
}

async fn relay_chat(state: &AppState, session: &SessionId, body: &[u8]) -> Result<Response> {
    let messages = parse_chat_request(body)?;
    info!(session_id = %session, message_count = messages.len(), "Forwarding to dialogue backend");

    let upstream = state
        .dialogue
        .send_message_stream(
            &messages,
            Some(session),
            Some(state.dialogue.request_config().clone()),
        )
        .await?;

    let session_for_log = session.clone();
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        warn!(session_id = %session_for_log, error = %e, "Streaming error");
    });

    let session_header = HeaderValue::from_str(session.as_str())
        .map_err(|e| PartsbotError::Gateway(e.to_string()))?;

    Response::builder()
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .header(SESSION_HEADER, session_header)
        .body(Body::from_stream(stream))
        .map_err(|e| PartsbotError::Gateway(e.to_string()))
}

// POST /api/assist runs the local conversation graph
pub async fn assist(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let messages = match parse_chat_request(&body) {
        Ok(m) => m,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "success": false, "error": e.to_string() })),
            );
        }
    };

    let outcome = state.graph.process_messages(messages).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "messages": outcome.messages,
            "step": outcome.step,
            "truckInfo": outcome.truck_info,
            "searchResults": outcome.search_results,
        })),
    )
}

// GET /api/health proxies the dialogue backend health check
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let url = state.dialogue.base_url().to_string();
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.dialogue.health().await {
        Ok(status) => {
            let connected = (200..300).contains(&status);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": if connected { "healthy" } else { "unhealthy" },
                    "backend": {
                        "url": url,
                        "connected": connected,
                        "status": status,
                    },
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": timestamp,
                })),
            )
        }
        Err(e) => {
            warn!(error = %e, "Dialogue backend health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "backend": {
                        "url": url,
                        "connected": false,
                        "error": e.to_string(),
                    },
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
