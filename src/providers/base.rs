use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single conversation turn. Ordered sequences of these form the payload
/// sent to the model backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Opaque chat backend: ordered messages in, reply text out.
///
/// Failures surface as `DeskbotError::Provider` (wrapped in anyhow) so callers
/// can distinguish retryable transport problems from malformed responses.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, messages: Vec<Message>) -> anyhow::Result<String>;

    fn default_model(&self) -> &str;
}
