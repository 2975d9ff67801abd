use async_stream::stream;
use async_trait::async_trait;

use crate::chat::{ChatDelta, ChatModel, ChatStream, CompletionRequest, FinishReason, WireRole};
use crate::errors::LlmError;

/// In-process model for development and tests: streams a fixed reply when
/// configured with one, otherwise echoes the last user message word by
/// word.
#[derive(Clone, Default)]
pub struct LocalEchoModel {
    reply: Option<String>,
}

impl LocalEchoModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

#[async_trait]
impl ChatModel for LocalEchoModel {
    async fn chat_stream(&self, req: CompletionRequest) -> Result<ChatStream, LlmError> {
        let text = match &self.reply {
            Some(reply) => reply.clone(),
            None => req
                .messages
                .iter()
                .rev()
                .find(|m| m.role == WireRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default(),
        };

        let words: Vec<String> = text
            .split_inclusive(' ')
            .map(|word| word.to_string())
            .collect();

        let stream = stream! {
            for word in words {
                yield Ok(ChatDelta {
                    text_delta: Some(word),
                    finish: None,
                });
            }
            yield Ok(ChatDelta {
                text_delta: None,
                finish: Some(FinishReason::Stop),
            });
        };

        Ok(Box::pin(stream))
    }
}
