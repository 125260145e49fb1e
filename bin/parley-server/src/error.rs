//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** storage and upstream failures are logged with full
//! detail but only a generic message is returned to the caller so that file
//! paths, provider responses or keys never leak to clients.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::entities::StoreError;
use crate::upstream::UpstreamError;

/// All errors that can occur in the parley-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The request body is not declared as JSON.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Propagated from the record store.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The upstream model provider failed before streaming started.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::Storage(StoreError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            ServerError::Storage(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Upstream(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m)
            | ServerError::PayloadTooLarge(m)
            | ServerError::UnsupportedMediaType(m) => {
                warn!(status = status.as_u16(), message = %m, "request rejected");
                m.clone()
            }
            ServerError::Storage(e @ (StoreError::InvalidId(_) | StoreError::NotFound(_))) => {
                warn!(status = status.as_u16(), error = %e, "request rejected");
                e.to_string()
            }

            // Internal errors: log the full detail, return a generic message.
            ServerError::Storage(e) => {
                error!(error = %e, "record store error");
                "failed to access record store".to_owned()
            }
            ServerError::Upstream(e) => {
                error!(error = %e, "upstream chat error");
                "upstream model provider error".to_owned()
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                "internal server error".to_owned()
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ServerError::PayloadTooLarge(message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ServerError::UnsupportedMediaType(message),
            _ => ServerError::BadRequest(message),
        }
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServerError::BadRequest(errors.to_string())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        // Keep the full chain in the logs; clients only see a generic message.
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
