pub use crate::chat::{
    ChatDelta, ChatModel, ChatStream, CompletionRequest, FinishReason, WireMessage, WireRole,
};
pub use crate::errors::LlmError;
pub use crate::local::LocalEchoModel;
pub use crate::openai::{OpenAiConfig, SseChatModel};
