//! Client for the conversational agent endpoint.
//!
//! One round trip per user turn: the whole transcript goes up, the whole
//! (authoritative) transcript comes back. No streaming.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;

use super::types::{ChatPayload, Message};
use super::{ApiError, endpoint};

#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Returns the name of the client (for logs).
    fn name(&self) -> &str;

    /// Sends the transcript (ending with the new user message) and returns the
    /// complete transcript as the agent sees it.
    async fn chat(&self, transcript: &[Message]) -> Result<Vec<Message>, ApiError>;
}

/// Agent client talking to `POST {base}/api/agent/chat/`.
pub struct HttpAgentClient {
    chat_url: Url,
    client: reqwest::Client,
}

impl HttpAgentClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            chat_url: endpoint(base_url, &["api", "agent", "chat", ""])?,
            client: reqwest::Client::new(),
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn chat(&self, transcript: &[Message]) -> Result<Vec<Message>, ApiError> {
        let payload = ChatPayload {
            messages: transcript.to_vec(),
        };

        info!(
            "Agent chat request: url={}, message_count={}",
            self.chat_url,
            payload.messages.len()
        );

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        debug!("Agent response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Agent API error: {} - {}", status, body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(ApiError::from_transport)?;
        let reply: ChatPayload = serde_json::from_str(&body).map_err(|e| {
            warn!("Agent response did not decode: {}", e);
            ApiError::MalformedResponse(e.to_string())
        })?;

        info!(
            "Agent chat reply: message_count={}",
            reply.messages.len()
        );
        Ok(reply.messages)
    }
}
