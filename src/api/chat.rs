use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

/// Shown whenever the assistant cannot be reached or answers with nothing usable.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't answer right now. Please try again in a moment.";

/// Reply fields the automation may answer with, in order of preference.
const REPLY_KEYS: [&str; 5] = ["output", "reply", "response", "message", "text"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    url: Option<String>,
}

impl ChatClient {
    pub fn new(client: Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    /// Asks the assistant. Never fails: problems degrade to [`FALLBACK_REPLY`].
    pub async fn ask(&self, request: &ChatRequest) -> String {
        let Some(url) = self.url.as_deref() else {
            return FALLBACK_REPLY.to_owned();
        };

        match self.post(url, request).await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                warn!(session_id = %request.session_id, "Chat webhook answered without a reply field");
                FALLBACK_REPLY.to_owned()
            }
            Err(err) => {
                warn!(session_id = %request.session_id, error = %err, "Chat webhook failed");
                FALLBACK_REPLY.to_owned()
            }
        }
    }

    async fn post(&self, url: &str, request: &ChatRequest) -> Result<Option<String>> {
        let body: Value = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context("Chat webhook unreachable")?
            .error_for_status()
            .context("Chat webhook returned an error status")?
            .json()
            .await
            .context("Failed to parse JSON")?;

        Ok(extract_reply(&body))
    }
}

/// Pulls the reply text out of whatever shape the automation answered with.
pub fn extract_reply(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_blank(text),
        Value::Array(values) => values.first().and_then(extract_reply),
        Value::Object(fields) => REPLY_KEYS
            .iter()
            .filter_map(|key| fields.get(*key))
            .find_map(|value| value.as_str().and_then(non_blank)),
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
