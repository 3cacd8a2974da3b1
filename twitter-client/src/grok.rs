use crate::session::TwitterSession;
use async_trait::async_trait;
use llm_interface::{ChatCapability, ChatMessage, ChatReply, ChatRole};
use marketeer_core::{CoreError, LlmError};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const CREATE_CONVERSATION_URL: &str =
    "https://api.x.com/graphql/6cmfJY3d7EPWuCSXWrkOFg/CreateGrokConversation";
const ADD_RESPONSE_URL: &str = "https://api.x.com/2/grok/add_response.json";

/// Chat provider backed by the platform's built-in assistant.
///
/// Only usable on a logged-in session; [`TwitterSession::chat_capability`]
/// enforces that by returning `None` without an auth cookie.
pub struct GrokChat {
    session: Arc<TwitterSession>,
}

impl TwitterSession {
    /// Exposes the session's chat capability, if the session can carry one.
    pub async fn chat_capability(self: &Arc<Self>) -> Option<Arc<dyn ChatCapability>> {
        let has_auth = self
            .cookies()
            .await
            .iter()
            .any(|c| c.key == "auth_token");
        if !has_auth {
            debug!("No auth cookie, session exposes no chat capability");
            return None;
        }
        Some(Arc::new(GrokChat {
            session: Arc::clone(self),
        }))
    }
}

impl GrokChat {
    async fn create_conversation(&self) -> Result<String, CoreError> {
        let response = self
            .session
            .request(Method::POST, CREATE_CONVERSATION_URL, Some(json!({})))
            .await?;

        response
            .pointer("/data/create_grok_conversation/conversation_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: "grok".to_string(),
                })
            })
    }
}

#[async_trait]
impl ChatCapability for GrokChat {
    fn provider(&self) -> &str {
        "grok"
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, CoreError> {
        let conversation_id = self.create_conversation().await?;
        debug!("Grok conversation {} created", conversation_id);

        let responses: Vec<Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "message": m.content,
                    "sender": if m.role == ChatRole::Assistant { 2 } else { 1 }
                })
            })
            .collect();
        let body = json!({
            "responses": responses,
            "systemPromptName": "",
            "grokModelOptionId": "grok-2a",
            "conversationId": conversation_id,
            "returnSearchResults": false,
            "returnCitations": false
        });

        // The endpoint streams newline-delimited JSON chunks, so the
        // generic session request path does not fit here.
        let mut headers = reqwest::header::HeaderMap::new();
        self.session.install_headers(&mut headers).await?;
        let response = self
            .session
            .client
            .post(ADD_RESPONSE_URL)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Grok chat request failed with status {}", status);
            return Err(CoreError::Llm(LlmError::ServiceUnavailable {
                provider: "grok".to_string(),
            }));
        }

        let text = response.text().await.map_err(CoreError::Network)?;
        let message = collect_message_chunks(&text);
        if message.is_empty() {
            return Err(CoreError::Llm(LlmError::EmptyReply {
                provider: "grok".to_string(),
            }));
        }

        Ok(ChatReply { message })
    }
}

/// Concatenates the `result.message` tokens out of a newline-delimited
/// chunk stream, skipping anything that is not a message chunk.
fn collect_message_chunks(raw: &str) -> String {
    raw.lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|chunk| {
            chunk
                .pointer("/result/message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketeer_core::SessionCookie;

    #[test]
    fn test_collect_message_chunks_joins_tokens() {
        let raw = concat!(
            "{\"result\":{\"message\":\"Hello\"}}\n",
            "{\"result\":{\"sender\":\"ASSISTANT\"}}\n",
            "{\"result\":{\"message\":\" world\"}}\n",
            "not json at all\n"
        );
        assert_eq!(collect_message_chunks(raw), "Hello world");
    }

    #[test]
    fn test_collect_message_chunks_empty_stream() {
        assert_eq!(collect_message_chunks(""), "");
        assert_eq!(collect_message_chunks("{\"other\":1}"), "");
    }

    #[tokio::test]
    async fn test_chat_capability_requires_auth_cookie() {
        let session = Arc::new(TwitterSession::new().unwrap());
        assert!(session.chat_capability().await.is_none());

        session
            .set_cookies(vec![SessionCookie::new("auth_token", "t")])
            .await;
        let capability = session.chat_capability().await.unwrap();
        assert_eq!(capability.provider(), "grok");
    }
}
