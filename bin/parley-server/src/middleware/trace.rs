use crate::error::ServerError;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Request bodies up to this size are echoed into the log.
const MAX_LOGGED_BODY: usize = 1024;

/// Per-request span, request-body logging and `x-trace-id` propagation.
///
/// Response bodies are passed through untouched: `/api/chat` streams, and
/// buffering it here would hold every chunk until the upstream finished.
/// Request bodies are only buffered when their declared length is small
/// enough to log; larger ones go to the handler's size limit as-is.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (mut parts, body) = req.into_parts();
        let body = if body_is_loggable(&parts.headers) {
            match buffer_and_log(body).await {
                Ok(bytes) => Body::from(bytes),
                Err(response) => return response,
            }
        } else {
            if let Some(len) = content_length(&parts.headers) {
                info!("request body: [not logged, {} bytes]", len);
            }
            body
        };
        if let Some(value) = &header_value {
            parts.headers.insert(X_TRACE_ID, value.clone());
        }

        let mut response = next.run(Request::from_parts(parts, body)).await;

        if let Some(value) = header_value {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response headers sent"
        );

        response
    }
    .instrument(span)
    .await
}

fn is_json(headers: &header::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

fn content_length(headers: &header::HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// A JSON body whose declared length fits in the log line.
fn body_is_loggable(headers: &header::HeaderMap) -> bool {
    is_json(headers) && content_length(headers).is_some_and(|len| len <= MAX_LOGGED_BODY)
}

async fn buffer_and_log(body: Body) -> Result<Bytes, Response> {
    let bytes = body
        .collect()
        .await
        .map_err(|e| {
            ServerError::BadRequest(format!("failed to read request body: {e}")).into_response()
        })?
        .to_bytes();

    if let Ok(text) = std::str::from_utf8(&bytes) {
        info!("request body: {}", text);
    }

    Ok(bytes)
}
