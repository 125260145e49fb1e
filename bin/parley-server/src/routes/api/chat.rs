//! Chat completion proxy.
//!
//! Streams upstream fragments to the caller as Server-Sent Events: one
//! `data: <chunk>` frame per fragment followed by a final `data: [DONE]`.
//! When the upstream fails after the first byte has been sent the connection
//! is aborted without `[DONE]`, so clients can tell a truncated answer from a
//! complete one.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, error, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::routes::ApiJson;
use crate::schemas::api::chat::{ChatCompletionRequest, ChatConfiguration, ChatResponse};
use crate::state::AppState;
use crate::upstream::{ChatMessage, ChatRole, ChunkStream, UpstreamError};

const DONE: &str = "[DONE]";

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(
        ChatCompletionRequest,
        ChatConfiguration,
        ChatMessage,
        ChatRole,
        ChatResponse
    ))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Completion as an SSE stream, or JSON when `stream` is false",
            content(
                (String = "text/event-stream"),
                (ChatResponse = "application/json")
            )
        ),
        (status = 400, description = "Malformed or invalid request"),
        (status = 500, description = "Upstream failed before streaming started"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ChatCompletionRequest>,
) -> Result<Response, ServerError> {
    req.validate()?;
    let (request, stream) = req.into_upstream();
    info!(
        model = %request.model,
        messages = request.messages.len(),
        roles = ?request.roles(),
        max_tokens = request.max_tokens,
        stream,
        "chat request"
    );

    if !stream {
        let response = state.upstream.complete(request).await?;
        debug!(chars = response.len(), "chat completion finished");
        return Ok(Json(ChatResponse { response }).into_response());
    }

    let chunks = state.upstream.stream_chat(request).await?;
    Ok(Sse::new(sse_frames(chunks)).into_response())
}

/// Map upstream fragments to SSE events, closing with `[DONE]` on success.
///
/// A failed fragment ends the stream with an error so the body is cut short
/// instead of terminated cleanly.
fn sse_frames(chunks: ChunkStream) -> impl Stream<Item = Result<Event, UpstreamError>> + Send {
    stream::unfold(Some(chunks), |state| async move {
        let mut chunks = state?;
        match chunks.next().await {
            Some(Ok(text)) => {
                let event = Event::default().data(normalize_newlines(&text));
                Some((Ok(event), Some(chunks)))
            }
            Some(Err(e)) => {
                error!(error = %e, "upstream failed mid-stream; aborting response");
                Some((Err(e), None))
            }
            None => {
                debug!("chat stream complete");
                Some((Ok(Event::default().data(DONE)), None))
            }
        }
    })
}

/// SSE payloads may not carry `\r`; embedded line breaks become extra
/// `data:` lines, which clients join back with `\n`.
fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_owned()
    }
}
