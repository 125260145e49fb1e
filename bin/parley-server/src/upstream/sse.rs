//! Decoding of the upstream `text/event-stream` body.
//!
//! Network chunks do not respect line boundaries, so [`SseDecoder`] buffers
//! bytes and hands out the payload of each complete `data:` line. Comment
//! lines (`: keep-alive`), blank separators and other fields are dropped.

use memchr::memchr;
use serde::Deserialize;

use crate::upstream::UpstreamError;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Terminate a trailing line that arrived without its newline.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            self.buffer.push(b'\n');
        }
    }

    /// Payload of the next complete `data:` line, if one is buffered.
    pub fn next_data(&mut self) -> Option<Result<String, UpstreamError>> {
        while let Some(newline) = memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = match std::str::from_utf8(&line) {
                Ok(s) => s.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    return Some(Err(UpstreamError::Decode(format!(
                        "invalid UTF-8 in event stream: {e}"
                    ))));
                }
            };
            if let Some(payload) = line.strip_prefix("data:") {
                return Some(Ok(payload.trim_start().to_owned()));
            }
        }
        None
    }
}

/// What one `data:` payload means for the chunk sequence.
#[derive(Debug, PartialEq)]
pub enum StreamEvent {
    /// A text fragment to forward.
    Text(String),
    /// The upstream finished (`[DONE]`).
    Done,
    /// Nothing to forward (role-only delta, usage frame, empty payload).
    Skip,
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

pub fn interpret(payload: &str) -> Result<StreamEvent, UpstreamError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(StreamEvent::Skip);
    }
    if payload == "[DONE]" {
        return Ok(StreamEvent::Done);
    }

    let frame: StreamFrame = serde_json::from_str(payload)
        .map_err(|e| UpstreamError::Decode(format!("{e}: {payload}")))?;

    if let Some(error) = frame.error {
        let wrapped = serde_json::json!({ "error": error });
        return Err(UpstreamError::Provider(
            error_summary(&wrapped).unwrap_or_else(|| wrapped.to_string()),
        ));
    }

    let text = frame
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty());

    Ok(match text {
        Some(text) => StreamEvent::Text(text),
        None => StreamEvent::Skip,
    })
}

/// Pull a one-line human message out of a provider error body.
pub fn error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Summarise a raw error body (JSON or otherwise) for logs and error values.
pub fn summarise_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_owned();
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| error_summary(&v))
        .unwrap_or_else(|| trimmed.to_owned())
}
