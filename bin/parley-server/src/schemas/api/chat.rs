//! Request / response types of `POST /api/chat`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::upstream::{ChatMessage, ChatRequest};

fn default_temperature() -> f64 {
    0.7
}

fn default_stream() -> bool {
    true
}

/// Parameters for one upstream call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatConfiguration {
    /// Upstream model identifier.
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,
    /// Maximum tokens to generate. `maxTokens` is accepted as well.
    #[serde(alias = "maxTokens")]
    #[validate(range(min = 1, message = "max_tokens must be at least 1"))]
    pub max_tokens: u32,
    /// Sampling temperature in [0, 2].
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0, message = "temperature must be between 0 and 2"))]
    pub temperature: f64,
    /// `false` returns the whole completion as `{"response": ...}`.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatCompletionRequest {
    /// Conversation, forwarded upstream in this exact order.
    #[validate(length(min = 1, message = "messages must not be empty"))]
    pub messages: Vec<ChatMessage>,
    #[validate(nested)]
    pub configuration: ChatConfiguration,
}

impl ChatCompletionRequest {
    /// Split into the upstream call and the `stream` flag.
    pub fn into_upstream(self) -> (ChatRequest, bool) {
        let ChatCompletionRequest {
            messages,
            configuration,
        } = self;
        let request = ChatRequest {
            messages,
            model: configuration.model,
            max_tokens: configuration.max_tokens,
            temperature: configuration.temperature,
        };
        (request, configuration.stream)
    }
}

/// Response body of a non-streaming `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}
