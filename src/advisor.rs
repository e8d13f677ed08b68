use serde_json::{Map, Value};

use crate::error::AdvisorError;
use crate::providers::{Message, Provider};

/// Structured advisory returned by the completion service.
///
/// Expected to carry `summary`, `risk_analysis`, `strategy` and `confidence`,
/// but a live reply is passed through without checking its keys.
pub type Response = Map<String, Value>;

pub const FALLBACK_SUMMARY: &str = "Fallback Mode Active: The AI service is currently unavailable.";
pub const FALLBACK_RISK_ANALYSIS: &str =
    "Cannot perform live analysis. Deterministic calculations still verify portfolio metrics.";
pub const FALLBACK_STRATEGY: &str = "Please check your GROQ_API_KEY or connection.";
pub const FALLBACK_CONFIDENCE: &str = "Low";

/// The fixed response substituted whenever the live call cannot be completed.
pub fn fallback_response() -> Response {
    [
        ("summary", FALLBACK_SUMMARY),
        ("risk_analysis", FALLBACK_RISK_ANALYSIS),
        ("strategy", FALLBACK_STRATEGY),
        ("confidence", FALLBACK_CONFIDENCE),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
    .collect()
}

/// Turns a system instruction plus a data payload into a structured advisory.
///
/// Holds no state between calls other than the injected provider.
pub struct ResponseGenerator<P> {
    provider: P,
}

impl<P: Provider> ResponseGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[cfg(test)]
    fn provider(&self) -> &P {
        &self.provider
    }

    /// One completion call in JSON-object mode. Every failure, including a
    /// reply that is not a JSON object, is `ServiceUnavailable`.
    pub async fn try_generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Response, AdvisorError> {
        let messages = [Message::system(system_prompt), Message::user(user_prompt)];
        let reply = self.provider.complete(&messages).await?;

        parse_reply(reply.content())
    }

    /// Like [`Self::try_generate`], but never fails: faults are logged and
    /// replaced by [`fallback_response`].
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Response {
        match self.try_generate(system_prompt, user_prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(provider = self.provider.name(), "{e}");
                fallback_response()
            }
        }
    }
}

fn parse_reply(content: &str) -> Result<Response, AdvisorError> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AdvisorError::ServiceUnavailable(format!(
            "reply is not a JSON object: {other}"
        ))),
        Err(e) => Err(AdvisorError::ServiceUnavailable(format!(
            "reply is not valid JSON: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// In-process provider: replays a canned reply and records what it was sent.
    struct StubProvider {
        reply: Result<String, String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl StubProvider {
        fn replying(content: &str) -> Self {
            Self {
                reply: Ok(content.to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, messages: &[Message]) -> Result<Message, AdvisorError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(content) => Ok(Message::Assistant {
                    content: content.clone(),
                }),
                Err(reason) => Err(AdvisorError::ServiceUnavailable(reason.clone())),
            }
        }
    }

    const LIVE: &str = r#"{"summary":"A","risk_analysis":"B","strategy":"C","confidence":"D"}"#;

    #[test]
    fn fallback_has_exact_values() {
        let fallback = fallback_response();
        assert_eq!(
            Value::Object(fallback),
            json!({
                "summary": "Fallback Mode Active: The AI service is currently unavailable.",
                "risk_analysis": "Cannot perform live analysis. Deterministic calculations still verify portfolio metrics.",
                "strategy": "Please check your GROQ_API_KEY or connection.",
                "confidence": "Low",
            })
        );
    }

    #[tokio::test]
    async fn live_reply_passes_through() {
        let generator = ResponseGenerator::new(StubProvider::replying(LIVE));
        let response = generator.generate("sys", "{}").await;
        assert_eq!(
            Value::Object(response),
            json!({"summary": "A", "risk_analysis": "B", "strategy": "C", "confidence": "D"})
        );
    }

    #[tokio::test]
    async fn sends_system_then_user() {
        let generator = ResponseGenerator::new(StubProvider::replying(LIVE));
        generator.generate("be strict", "{\"risk_score\":1.5}").await;

        let seen = generator.provider().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            vec![Message::system("be strict"), Message::user("{\"risk_score\":1.5}")]
        );
    }

    #[tokio::test]
    async fn provider_fault_yields_fallback() {
        let generator = ResponseGenerator::new(StubProvider::failing("connection refused"));
        assert_eq!(generator.generate("sys", "{}").await, fallback_response());

        let err = generator.try_generate("sys", "{}").await.unwrap_err();
        assert!(matches!(err, AdvisorError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn non_json_reply_yields_fallback() {
        let generator = ResponseGenerator::new(StubProvider::replying("not json"));
        assert_eq!(generator.generate("sys", "{}").await, fallback_response());
    }

    #[tokio::test]
    async fn non_object_json_yields_fallback() {
        let generator = ResponseGenerator::new(StubProvider::replying("[1, 2, 3]"));
        let err = generator.try_generate("sys", "{}").await.unwrap_err();
        assert!(matches!(err, AdvisorError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn unexpected_keys_are_not_validated() {
        let generator = ResponseGenerator::new(StubProvider::replying(r#"{"foo":"bar"}"#));
        let response = generator.generate("sys", "{}").await;
        assert_eq!(Value::Object(response), json!({"foo": "bar"}));
    }

    #[tokio::test]
    async fn empty_prompts_still_total() {
        let generator = ResponseGenerator::new(StubProvider::failing("boom"));
        let response = generator.generate("", "").await;
        let mut keys: Vec<_> = response.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["confidence", "risk_analysis", "strategy", "summary"]);
    }

    #[tokio::test]
    async fn fenced_json_yields_fallback() {
        let fenced = "```json\n{\"summary\":\"A\"}\n```";
        let generator = ResponseGenerator::new(StubProvider::replying(fenced));
        assert_eq!(generator.generate("sys", "{}").await, fallback_response());
    }

    #[tokio::test]
    async fn live_key_order_is_kept() {
        let generator = ResponseGenerator::new(StubProvider::replying(LIVE));
        let response = generator.generate("sys", "{}").await;
        let keys: Vec<_> = response.keys().map(String::as_str).collect();
        assert_eq!(keys, ["summary", "risk_analysis", "strategy", "confidence"]);
    }
}
