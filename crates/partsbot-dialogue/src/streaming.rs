use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Incremental parser for `text/event-stream` bodies.
/// SSE format: `event: <type>\ndata: <json>\n\n`
#[derive(Default)]
pub struct SseParser {
    buffer: String,
}

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// The `type` field of a JSON payload, falling back to the `event:` line.
    pub fn kind(&self) -> Option<String> {
        self.json()
            .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
            .or_else(|| self.event_type.clone())
    }

    /// Text carried by the event: the JSON `content` field, or the raw data.
    pub fn content(&self) -> Option<String> {
        match self.json() {
            Some(v) => v.get("content").and_then(|c| c.as_str()).map(str::to_string),
            None if self.data == "[DONE]" => None,
            None => Some(self.data.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind().as_deref() == Some("error")
    }

    fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.data).ok()
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed text into the parser and extract complete events.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(&chunk.replace("\r\n", "\n"));
        let mut events = Vec::new();

        // Split on double newlines (event boundaries)
        while let Some(pos) = self.buffer.find("\n\n") {
            let block = self.buffer[..pos].to_string();
            self.buffer = self.buffer[pos + 2..].to_string();

            let mut event_type = None;
            let mut data_lines = Vec::new();

            for line in block.lines() {
                if let Some(val) = line.strip_prefix("event:") {
                    event_type = Some(val.trim_start().to_string());
                } else if let Some(val) = line.strip_prefix("data:") {
                    data_lines.push(val.strip_prefix(' ').unwrap_or(val).to_string());
                }
            }

            if !data_lines.is_empty() {
                events.push(SseEvent {
                    event_type,
                    data: data_lines.join("\n"),
                });
            }
        }

        events
    }
}

/// Encode the single error event emitted when a chat request cannot be relayed.
pub fn error_event(message: &str) -> String {
    let payload = serde_json::json!({
        "type": "error",
        "content": message,
    });
    format!("data: {}\n\n", payload)
}

/// Drain the decodable prefix of `carry`. Invalid bytes become U+FFFD; only
/// an incomplete multi-byte sequence at the very end is kept for the next chunk.
fn decode_carry(carry: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut start = 0;

    loop {
        match std::str::from_utf8(&carry[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                start = carry.len();
                break;
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&carry[start..valid_end]));
                match e.error_len() {
                    Some(bad) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + bad;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }

    carry.drain(..start);
    text
}

/// A stream of SSE events from raw bytes.
pub struct SseStream<S> {
    inner: S,
    parser: SseParser,
    pending: Vec<SseEvent>,
    carry: Vec<u8>,
}

impl<S> SseStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: SseParser::new(),
            pending: Vec::new(),
            carry: Vec::new(),
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Unpin,
{
    type Item = SseEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            // Return pending events first
            if !this.pending.is_empty() {
                return Poll::Ready(Some(this.pending.remove(0)));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.carry.extend_from_slice(&bytes);
                    let text = decode_carry(&mut this.carry);
                    this.pending = this.parser.feed(&text);
                }
                Poll::Ready(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Dialogue stream interrupted");
                    return Poll::Ready(None);
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
