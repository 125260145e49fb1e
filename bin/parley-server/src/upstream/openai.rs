//! OpenAI-compatible `/chat/completions` client over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::upstream::sse::{self, SseDecoder, StreamEvent};
use crate::upstream::{ChatMessage, ChatRequest, ChatUpstream, ChunkStream, UpstreamError};

#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
    client: reqwest::Client,
    completions_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatible {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| UpstreamError::Config(e.to_string()))?;
        Ok(Self {
            client,
            completions_url: completions_url(base_url),
            api_key: api_key.into(),
        })
    }

    /// Send the request and fail fast on anything but a 2xx status.
    async fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, UpstreamError> {
        let body = CompletionBody {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        };

        debug!(
            url = %self.completions_url,
            model = %request.model,
            messages = request.messages.len(),
            stream,
            "calling upstream"
        );

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_owned());
            let message = sse::summarise_body(&text);
            warn!(status = status.as_u16(), %message, "upstream rejected request");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatUpstream for OpenAiCompatible {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, UpstreamError> {
        let response = self.send(&request, true).await?;
        Ok(chunk_stream(response.bytes_stream().boxed()))
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, UpstreamError> {
        let response = self.send(&request, false).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| UpstreamError::Decode("response has no choices".into()))
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

struct ChunkState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    body_done: bool,
    finished: bool,
}

/// Turn an upstream SSE body into text fragments.
///
/// The state (and with it the response body) is dropped as soon as the
/// sequence ends, whichever way it ends.
fn chunk_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> ChunkStream {
    let state = ChunkState {
        body,
        decoder: SseDecoder::new(),
        body_done: false,
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        if st.finished {
            return None;
        }
        loop {
            if let Some(payload) = st.decoder.next_data() {
                let event = payload.and_then(|p| sse::interpret(&p));
                match event {
                    Ok(StreamEvent::Text(text)) => return Some((Ok(text), st)),
                    Ok(StreamEvent::Skip) => continue,
                    Ok(StreamEvent::Done) => return None,
                    Err(e) => {
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                }
            }

            if st.body_done {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => st.decoder.feed(&bytes),
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(UpstreamError::Transport(e)), st));
                }
                None => {
                    st.body_done = true;
                    st.decoder.finish();
                }
            }
        }
    })
    .boxed()
}
