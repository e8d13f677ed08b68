use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AdvisorError;

use super::{Message, Provider};

pub const MODEL: &str = "llama3-70b-8192";

/// Low sampling temperature for near-deterministic phrasing. Not configurable.
pub const TEMPERATURE: f64 = 0.2;

// --- Wire structs (OpenAI-compatible chat completions) ---

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    response_format: WireResponseFormat,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Groq chat completions client.
///
/// Holds one long-lived `reqwest::Client`; construct once at startup and reuse.
/// Concurrent calls are independent requests over the shared connection pool.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GroqProvider {
    pub fn new(config: &Config, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.clone(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub(crate) fn build_body(messages: &[Message]) -> ChatRequest<'_> {
        ChatRequest {
            model: MODEL,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role(),
                    content: m.content(),
                })
                .collect(),
            temperature: TEMPERATURE,
            response_format: WireResponseFormat {
                kind: "json_object",
            },
        }
    }
}

impl Provider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, messages: &[Message]) -> Result<Message, AdvisorError> {
        let body = Self::build_body(messages);
        tracing::debug!(
            model = MODEL,
            messages = messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::ServiceUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AdvisorError::ServiceUnavailable(format!("malformed completion envelope: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdvisorError::ServiceUnavailable("reply has no choices".to_owned()))?
            .message
            .content
            .ok_or_else(|| AdvisorError::ServiceUnavailable("reply has no content".to_owned()))?;

        Ok(Message::Assistant { content })
    }
}

/// Map a non-success HTTP status to a diagnostic.
fn status_error(status: u16, body: &str) -> AdvisorError {
    let message = match status {
        401 | 403 => format!("authentication failed (HTTP {status})"),
        402 => "usage limit reached, add credits".to_owned(),
        429 => "rate limit exceeded".to_owned(),
        _ => format!("HTTP {status}: {body}"),
    };
    AdvisorError::ServiceUnavailable(message)
}
