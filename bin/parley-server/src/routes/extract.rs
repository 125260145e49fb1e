use axum::extract::FromRequest;

use crate::error::ServerError;

/// `axum::Json` whose rejections (bad JSON, missing fields, wrong content
/// type) surface as `400 {"error": ...}` instead of axum's plain-text 4xx.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);
