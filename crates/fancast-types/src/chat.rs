use serde::{Deserialize, Serialize};

/// Roles a conversation turn can carry. The wire uses lowercase tags; any
/// other tag is rejected at deserialization rather than forwarded to the
/// model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One prior turn of a conversation as submitted by the client. Server
/// metadata (such as prior source manifests) is never part of a turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// A ranked text excerpt returned by the retrieval service, with the
/// originating document as its provenance label. Constructed per chat turn
/// and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
}

/// Bound applied to conversation history before it is forwarded to the
/// model: only the most recent turns survive, older ones are dropped, not
/// summarized.
pub const HISTORY_WINDOW: usize = 10;

/// Truncates `history` to its final [`HISTORY_WINDOW`] entries, preserving
/// relative order.
pub fn window_history(history: &[ChatTurn]) -> &[ChatTurn] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(i: usize) -> ChatTurn {
        ChatTurn {
            role: if i % 2 == 0 {
                ChatRole::User
            } else {
                ChatRole::Assistant
            },
            content: format!("turn-{i}"),
        }
    }

    #[test]
    fn window_keeps_last_ten_in_order() {
        let history: Vec<ChatTurn> = (0..14).map(turn).collect();
        let windowed = window_history(&history);
        assert_eq!(windowed.len(), HISTORY_WINDOW);
        assert_eq!(windowed.first().unwrap().content, "turn-4");
        assert_eq!(windowed.last().unwrap().content, "turn-13");
    }

    #[test]
    fn window_passes_short_history_through() {
        let history: Vec<ChatTurn> = (0..3).map(turn).collect();
        assert_eq!(window_history(&history), &history[..]);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = serde_json::from_str::<ChatTurn>(r#"{"role":"system","content":"x"}"#);
        assert!(err.is_err());
    }
}
