use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::ApiError;
use crate::metrics::{CHAT_DELTAS_TOTAL, CHAT_REQUESTS_TOTAL};
use crate::prompt::{compose_system_prompt, unique_sources};
use crate::state::AppState;
use crate::wire::{ContentFrame, SourcesFrame, DONE_SENTINEL};
use fancast_llm::prelude::{CompletionRequest, WireMessage, WireRole};
use fancast_types::prelude::{window_history, ChatRole, ChatTurn, TenantId};

#[derive(Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "orgId")]
    org_id: Option<String>,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

pub fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// The chat pipeline: authenticate, validate, retrieve tenant context,
/// compose the grounding instruction, stream the completion back out as
/// application-level events.
///
/// Order matters: an unauthenticated caller terminates before any
/// downstream call, so rejected requests cost nothing. Retrieval failure
/// degrades to an ungrounded answer; only model-stream setup failure is a
/// hard error, surfaced as a non-streaming response.
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(_user) = state.verifier.verify(bearer_token(&headers)).await else {
        return Err(ApiError::unauthorized());
    };

    let payload: ChatPayload = serde_json::from_slice(&body).map_err(|err| {
        debug!("chat payload decode failed: {err}");
        ApiError::bad_request("Invalid request body")
    })?;

    let Some(message) = required(payload.message) else {
        return Err(ApiError::bad_request("Message is required"));
    };
    let Some(org_id) = required(payload.org_id) else {
        return Err(ApiError::bad_request("orgId is required"));
    };
    let tenant = TenantId(org_id);

    let retrieval = state.retrieval.retrieve(&message, &tenant).await;
    if let Some(warning) = &retrieval.warning {
        warn!(tenant = %tenant, "context retrieval degraded: {warning}");
    }

    let sources = unique_sources(&retrieval.passages);
    let system_prompt = compose_system_prompt(&retrieval.passages);

    let history = window_history(&payload.history);
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(WireMessage {
        role: WireRole::System,
        content: system_prompt,
    });
    for turn in history {
        messages.push(WireMessage {
            role: match turn.role {
                ChatRole::User => WireRole::User,
                ChatRole::Assistant => WireRole::Assistant,
            },
            content: turn.content.clone(),
        });
    }
    messages.push(WireMessage {
        role: WireRole::User,
        content: message,
    });

    let request = CompletionRequest {
        model: state.chat.model.clone(),
        messages,
        temperature: Some(state.chat.temperature),
        max_tokens: Some(state.chat.max_tokens),
    };

    let model_stream = match state.model.chat_stream(request).await {
        Ok(stream) => stream,
        Err(err) => {
            error!(tenant = %tenant, "chat stream setup failed: {}", err.0);
            return Err(ApiError::internal("Failed to process chat message"));
        }
    };

    state.meter.counter(&CHAT_REQUESTS_TOTAL).inc(1);
    let meter = state.meter.clone();

    let stream = async_stream::stream! {
        // Sources lead the stream, even when empty, so the client can
        // render provenance before content arrives.
        let first = serde_json::to_string(&SourcesFrame { sources })
            .unwrap_or_else(|_| r#"{"sources":[]}"#.to_string());
        yield Ok::<Event, Infallible>(Event::default().data(first));

        let mut inner = model_stream;
        while let Some(delta) = inner.next().await {
            match delta {
                Ok(delta) => {
                    let Some(content) = delta.text_delta else {
                        continue;
                    };
                    if content.is_empty() {
                        continue;
                    }
                    match serde_json::to_string(&ContentFrame { content }) {
                        Ok(json) => {
                            meter.counter(&CHAT_DELTAS_TOTAL).inc(1);
                            yield Ok(Event::default().data(json));
                        }
                        Err(err) => {
                            error!("content frame encode failed: {err}");
                            break;
                        }
                    }
                }
                Err(err) => {
                    // The stream is already open; end it with the sentinel
                    // so the client-side reconstruction never hangs.
                    error!("model stream failed mid-generation: {}", err.0);
                    break;
                }
            }
        }

        yield Ok(Event::default().data(DONE_SENTINEL));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()).into_response())
}
