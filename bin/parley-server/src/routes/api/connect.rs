//! Connectivity probe used by the web client on startup.

use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

use crate::schemas::api::common::ConnectResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(connect), components(schemas(ConnectResponse)))]
pub struct ConnectApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/connect", get(connect))
}

/// Returns `{"message": "successful"}` with HTTP 200.
#[utoipa::path(
    get,
    path = "/api/connect",
    tag = "connect",
    responses(
        (status = 200, description = "Backend reachable", body = ConnectResponse)
    )
)]
pub async fn connect() -> Json<ConnectResponse> {
    info!("client connected");
    Json(ConnectResponse {
        message: "successful".into(),
    })
}
