use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::errors::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
}

/// A message as forwarded to the completion endpoint: role and text only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Other(String),
}

/// One increment of a streamed completion. Text deltas arrive in
/// generation order; the final delta carries the finish reason and no text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default)]
    pub text_delta: Option<String>,
    #[serde(default)]
    pub finish: Option<FinishReason>,
}

pub type ChatStream = BoxStream<'static, Result<ChatDelta, LlmError>>;

/// A model capable of streaming a completion. The returned stream is lazy,
/// finite, and non-restartable: consumers read until the finish delta or
/// the stream ends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat_stream(&self, req: CompletionRequest) -> Result<ChatStream, LlmError>;
}
