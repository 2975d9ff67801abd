use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode, Url,
};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatDelta, ChatModel, ChatStream, CompletionRequest, FinishReason};
use crate::errors::LlmError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Configuration options for the completion provider.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| LlmError::unknown(&format!("base url parse failed: {err}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            request_timeout: Duration::from_secs(60),
        })
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, LlmError> {
        self.base_url = Url::parse(base_url.as_ref())
            .map_err(|err| LlmError::unknown(&format!("base url parse failed: {err}")))?;
        if !self.base_url.path().ends_with('/') {
            self.base_url
                .set_path(&format!("{}/", self.base_url.path().trim_end_matches('/')));
        }
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Streaming completion client over the provider's SSE chat endpoint.
pub struct SseChatModel {
    client: Client,
    chat_url: Url,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [crate::chat::WireMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize, Default)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize, Default)]
struct StreamChoice {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl SseChatModel {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = format!("Bearer {}", config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|err| LlmError::unknown(&format!("invalid api key: {err}")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| LlmError::unknown(&format!("client build failed: {err}")))?;

        let chat_url = config
            .base_url
            .join(CHAT_COMPLETIONS_PATH)
            .map_err(|err| LlmError::unknown(&format!("chat url join failed: {err}")))?;

        Ok(Self { client, chat_url })
    }
}

#[async_trait]
impl ChatModel for SseChatModel {
    async fn chat_stream(&self, req: CompletionRequest) -> Result<ChatStream, LlmError> {
        let payload = serde_json::to_value(ChatCompletionRequest {
            model: &req.model,
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stream: true,
        })
        .map_err(|err| LlmError::schema(&format!("request encode failed: {err}")))?;

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| LlmError::provider_unavailable(&format!("request error: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let stream = try_stream! {
            let mut body = response.bytes_stream();
            let mut buffer = String::new();
            let mut data_buf = String::new();
            let mut finish_final: Option<FinishReason> = None;
            let mut done = false;

            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|err| {
                    LlmError::provider_unavailable(&format!("stream chunk error: {err}"))
                })?;
                let chunk_str = std::str::from_utf8(&chunk).map_err(|err| {
                    LlmError::provider_unavailable(&format!("stream utf8 error: {err}"))
                })?;
                buffer.push_str(chunk_str);

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].to_string();
                    buffer = buffer[pos + 1..].to_string();

                    if line.starts_with("data:") {
                        let data = line
                            .trim_start_matches("data:")
                            .trim_start_matches(' ')
                            .to_string();
                        if !data.is_empty() {
                            if !data_buf.is_empty() {
                                data_buf.push('\n');
                            }
                            data_buf.push_str(&data);
                        }
                    } else if line.is_empty() {
                        if data_buf.is_empty() {
                            continue;
                        }
                        let data = data_buf.trim_end();
                        if data == "[DONE]" {
                            done = true;
                            data_buf.clear();
                            break;
                        }

                        let chunk: StreamChunk = serde_json::from_str(data).map_err(|err| {
                            LlmError::provider_unavailable(&format!(
                                "stream decode error: {err}; payload={data}"
                            ))
                        })?;

                        for choice in chunk.choices {
                            if choice.index != 0 {
                                continue;
                            }
                            if let Some(content) = choice.delta.content {
                                if !content.is_empty() {
                                    yield ChatDelta {
                                        text_delta: Some(content),
                                        finish: None,
                                    };
                                }
                            }
                            if let Some(reason) = choice.finish_reason {
                                finish_final = Some(map_finish_reason(&reason));
                            }
                        }

                        data_buf.clear();
                    }
                }

                if done {
                    break;
                }
            }

            yield ChatDelta {
                text_delta: None,
                finish: Some(finish_final.unwrap_or(FinishReason::Stop)),
            };
        };

        Ok(Box::pin(stream))
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::provider_unavailable(&format!("provider auth failed: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::provider_unavailable(&format!("provider rate limited request: {body}"))
        }
        StatusCode::BAD_REQUEST => LlmError::schema(&format!("provider rejected request: {body}")),
        _ => LlmError::provider_unavailable(&format!(
            "provider returned {}: {}",
            status.as_u16(),
            body
        )),
    }
}
