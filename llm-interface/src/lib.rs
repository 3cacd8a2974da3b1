use async_trait::async_trait;
use marketeer_core::CoreError;
use serde::{Deserialize, Serialize};

/// One message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Reply from a chat provider.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: String,
}

/// Optional chat capability a session may expose.
///
/// Callers hold this as `Option<Arc<dyn ChatCapability>>` and check for
/// presence instead of probing methods at runtime; absence means the
/// template-rendering fallback is used.
#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Provider name, used in logs and error context.
    fn provider(&self) -> &str;

    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.content, "hello");

        let msg = ChatMessage::system("be brief");
        assert_eq!(msg.role, ChatRole::System);
    }

    #[test]
    fn test_role_serialization_is_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
