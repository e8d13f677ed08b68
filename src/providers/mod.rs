pub mod groq;

use std::future::Future;

use crate::error::AdvisorError;

/// Role-tagged messages exchanged with the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Wire name of the role.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content } | Self::Assistant { content } => {
                content
            }
        }
    }
}

/// Extension point for completion backends. The generator is generic over it,
/// so tests can swap the live service for an in-process stand-in.
///
/// `complete` always asks for a JSON object reply. Implementations must not
/// retry: one call is one request.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn complete(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<Message, AdvisorError>> + Send;
}
