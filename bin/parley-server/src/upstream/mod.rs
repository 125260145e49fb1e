//! Upstream chat-completion client.
//!
//! [`ChatUpstream`] is the seam handlers talk to; [`OpenAiCompatible`] is the
//! production implementation for any `/chat/completions` endpoint speaking the
//! OpenAI wire format (OpenRouter by default).
//!
//! A streaming call returns a [`ChunkStream`]: a lazy, finite sequence of text
//! fragments that ends with `None` on normal completion, or with a single
//! terminal `Err` item. Failures that happen before any body is read
//! (connection refused, non-2xx status) are returned from
//! [`ChatUpstream::stream_chat`] itself so the caller can still answer with a
//! proper status code. Dropping the stream drops the upstream response and
//! closes its connection.

pub mod openai;
pub mod sse;
pub mod types;

pub use openai::OpenAiCompatible;
pub use types::{ChatMessage, ChatRequest, ChatRole};

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Incremental text fragments of one completion.
pub type ChunkStream = BoxStream<'static, Result<String, UpstreamError>>;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The HTTP client could not be built.
    #[error("upstream client misconfigured: {0}")]
    Config(String),

    /// Connection, TLS or body transfer failure.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The upstream reported an error inside an otherwise successful response.
    #[error("upstream error: {0}")]
    Provider(String),

    /// The response could not be understood.
    #[error("malformed upstream response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ChatUpstream: Send + Sync + 'static {
    /// Start a streaming completion.
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, UpstreamError>;

    /// Run a completion to the end and return the full text.
    async fn complete(&self, request: ChatRequest) -> Result<String, UpstreamError>;
}

/// Scripted upstream for handler tests.
#[cfg(test)]
pub mod stub {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use futures::stream;
    use futures::StreamExt;

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Step {
        Chunk(&'static str),
        Fail(&'static str),
    }

    #[derive(Debug, Default)]
    pub struct ScriptedUpstream {
        steps: Vec<Step>,
        refuse: Option<&'static str>,
        pub seen: Mutex<Vec<ChatRequest>>,
        /// Set once a stream handed out by `stream_chat` has been dropped.
        pub released: Arc<AtomicBool>,
    }

    /// Lives inside the chunk stream and flips `released` when it goes away.
    struct ReleaseOnDrop(Arc<AtomicBool>);

    impl Drop for ReleaseOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl ScriptedUpstream {
        pub fn chunks(chunks: &[&'static str]) -> Self {
            Self::steps(chunks.iter().map(|c| Step::Chunk(*c)).collect())
        }

        pub fn is_released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }

        pub fn steps(steps: Vec<Step>) -> Self {
            Self {
                steps,
                ..Self::default()
            }
        }

        /// Fails every call before any chunk is produced.
        pub fn refusing(message: &'static str) -> Self {
            Self {
                refuse: Some(message),
                ..Self::default()
            }
        }

        fn record(&self, request: ChatRequest) -> Result<(), UpstreamError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request);
            }
            match self.refuse {
                Some(message) => Err(UpstreamError::Status {
                    status: 502,
                    message: message.to_owned(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ChatUpstream for ScriptedUpstream {
        async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, UpstreamError> {
            self.record(request)?;
            let items: Vec<Result<String, UpstreamError>> = self
                .steps
                .iter()
                .map(|step| match step {
                    Step::Chunk(text) => Ok((*text).to_owned()),
                    Step::Fail(message) => Err(UpstreamError::Provider((*message).to_owned())),
                })
                .collect();
            let guard = ReleaseOnDrop(self.released.clone());
            Ok(Box::pin(stream::iter(items).map(move |item| {
                let _held = &guard;
                item
            })))
        }

        async fn complete(&self, request: ChatRequest) -> Result<String, UpstreamError> {
            self.record(request)?;
            let mut text = String::new();
            for step in &self.steps {
                match step {
                    Step::Chunk(chunk) => text.push_str(chunk),
                    Step::Fail(message) => {
                        return Err(UpstreamError::Provider((*message).to_owned()));
                    }
                }
            }
            Ok(text)
        }
    }
}
