use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use partsbot_core::config::{usable_key, DialogueConfig};
use partsbot_core::error::{PartsbotError, Result};
use partsbot_core::types::{ChatMessage, SessionId};

/// Body sent to the dialogue backend's chat endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A tool invocation reported by the backend alongside its reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRecord {
    pub tool: String,
    #[serde(default)]
    pub args: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Non-streaming reply from `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueResponse {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
}

/// HTTP client for the external dialogue backend.
pub struct DialogueClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    request_config: serde_json::Map<String, serde_json::Value>,
}

impl DialogueClient {
    pub fn new(config: &DialogueConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| PartsbotError::DialogueRequest(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: usable_key(config.api_key.as_deref()).map(str::to_string),
            timeout,
            request_config: config.request_config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The default `config` object attached to chat requests.
    pub fn request_config(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.request_config
    }

    /// Stamp each message with the current time and wrap them for the backend.
    pub fn build_request(
        &self,
        messages: &[ChatMessage],
        session: Option<&SessionId>,
        config: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> DialogueRequest {
        let now = Utc::now();
        DialogueRequest {
            messages: messages.iter().map(|m| m.stamped(now)).collect(),
            session_id: session.map(|s| s.to_string()),
            config,
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(AUTHORIZATION, format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// `POST /chat`. Returns the raw response once the status is known to be 2xx.
    pub async fn send_message(
        &self,
        messages: &[ChatMessage],
        session: Option<&SessionId>,
        config: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Response> {
        let url = format!("{}/chat", self.base_url);
        let body = self.build_request(messages, session, config);
        info!(url = %url, message_count = body.messages.len(), session_id = ?body.session_id, "Sending request to dialogue backend");

        let response = self
            .authorize(self.http.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| PartsbotError::DialogueRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, body = %body, "Dialogue backend error");
            return Err(PartsbotError::DialogueStatus { status, body });
        }

        Ok(response)
    }

    /// `POST /chat/stream`. The caller consumes `bytes_stream()` of the result.
    pub async fn send_message_stream(
        &self,
        messages: &[ChatMessage],
        session: Option<&SessionId>,
        config: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Response> {
        let url = format!("{}/chat/stream", self.base_url);
        let body = self.build_request(messages, session, config);
        info!(url = %url, message_count = body.messages.len(), session_id = ?body.session_id, "Sending streaming request to dialogue backend");

        let response = self
            .authorize(self.http.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| PartsbotError::DialogueRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, body = %body, "Dialogue backend streaming error");
            return Err(PartsbotError::DialogueStream { status, body });
        }

        Ok(response)
    }

    /// Non-streaming chat, parsed.
    pub async fn get_chat_response(
        &self,
        messages: &[ChatMessage],
        session: Option<&SessionId>,
        config: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<DialogueResponse> {
        let response = self.send_message(messages, session, config).await?;
        response
            .json::<DialogueResponse>()
            .await
            .map_err(|e| PartsbotError::DialogueParse(e.to_string()))
    }

    /// `GET /health`. Returns the backend's HTTP status. Transport failures are errors.
    pub async fn health(&self) -> Result<u16> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .authorize(self.http.get(&url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PartsbotError::DialogueRequest(e.to_string()))?;
        let status = response.status().as_u16();
        debug!(status, "Dialogue backend health probe");
        Ok(status)
    }
}
