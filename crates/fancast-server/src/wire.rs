use serde::{Deserialize, Serialize};

/// Terminal sentinel closing every chat stream. Sent as a bare string, not
/// JSON; consumers match it before attempting to parse.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// First frame of every chat stream, emitted before any generated text so
/// a client can render provenance ahead of content. Present even when
/// empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourcesFrame {
    pub sources: Vec<String>,
}

/// One generated-text increment. Concatenated client-side in arrival
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentFrame {
    pub content: String,
}

/// An application-level event reconstructed from the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Sources(Vec<String>),
    Content(String),
    Done,
}

#[derive(Deserialize)]
struct FramePayload {
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    content: Option<String>,
}

/// Consumer-side reconstruction of the chat stream.
///
/// The wire is newline-delimited `data: <payload>` frames. A single read
/// may carry several frames or cut one mid-payload, so the decoder keeps
/// the unterminated tail buffered across feeds. A frame whose payload
/// fails JSON parsing is discarded without aborting the stream.
#[derive(Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            // Only complete lines are decoded, so a read boundary inside a
            // multi-byte character cannot garble a frame.
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };

            if payload == DONE_SENTINEL {
                events.push(StreamEvent::Done);
                continue;
            }

            let Ok(frame) = serde_json::from_str::<FramePayload>(payload) else {
                continue;
            };
            if let Some(sources) = frame.sources {
                events.push(StreamEvent::Sources(sources));
            }
            if let Some(content) = frame.content {
                events.push(StreamEvent::Content(content));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> String {
        [
            "data: {\"sources\":[\"Doc1\",\"Doc2\"]}\n\n",
            "data: {\"content\":\"Hel\"}\n\n",
            "data: {\"content\":\"lo\"}\n\n",
            "data: [DONE]\n\n",
        ]
        .concat()
    }

    fn reconstruct(events: &[StreamEvent]) -> (Vec<String>, String, bool) {
        let mut sources = Vec::new();
        let mut text = String::new();
        let mut done = false;
        for event in events {
            match event {
                StreamEvent::Sources(s) => sources = s.clone(),
                StreamEvent::Content(c) => text.push_str(c),
                StreamEvent::Done => done = true,
            }
        }
        (sources, text, done)
    }

    #[test]
    fn one_read_with_all_frames_reconstructs() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(frames().as_bytes());
        let (sources, text, done) = reconstruct(&events);
        assert_eq!(sources, vec!["Doc1".to_string(), "Doc2".to_string()]);
        assert_eq!(text, "Hello");
        assert!(done);
    }

    #[test]
    fn frame_split_mid_payload_reconstructs_identically() {
        let wire = frames();
        // Cut inside the first content frame's JSON payload.
        let cut = wire.find("Hel").unwrap() + 1;
        let mut decoder = FrameDecoder::new();
        let mut events = decoder.feed(wire[..cut].as_bytes());
        events.extend(decoder.feed(wire[cut..].as_bytes()));

        let (sources, text, done) = reconstruct(&events);
        assert_eq!(sources, vec!["Doc1".to_string(), "Doc2".to_string()]);
        assert_eq!(text, "Hello");
        assert!(done);
    }

    #[test]
    fn byte_at_a_time_feed_reconstructs_identically() {
        let wire = frames();
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for byte in wire.as_bytes() {
            events.extend(decoder.feed(&[*byte]));
        }
        let (sources, text, done) = reconstruct(&events);
        assert_eq!(text, "Hello");
        assert_eq!(sources.len(), 2);
        assert!(done);
    }

    #[test]
    fn multibyte_content_survives_per_byte_reads() {
        let wire = "data: {\"content\":\"héllo wörld\"}\ndata: [DONE]\n";
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for byte in wire.as_bytes() {
            events.extend(decoder.feed(&[*byte]));
        }
        let (_, text, done) = reconstruct(&events);
        assert_eq!(text, "héllo wörld");
        assert!(done);
    }

    #[test]
    fn malformed_frames_are_skipped_without_aborting() {
        let wire = [
            "data: {\"sources\":[]}\n\n",
            "data: {not json}\n\n",
            "data: {\"content\":\"ok\"}\n\n",
            "data: [DONE]\n\n",
        ]
        .concat();
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(wire.as_bytes());
        let (_, text, done) = reconstruct(&events);
        assert_eq!(text, "ok");
        assert!(done);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b": keep-alive\n\ndata: {\"content\":\"x\"}\n\n");
        assert_eq!(events, vec![StreamEvent::Content("x".into())]);
    }
}
