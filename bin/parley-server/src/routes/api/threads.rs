//! Thread persistence endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::ThreadStore;
use crate::error::ServerError;
use crate::routes::ApiJson;
use crate::schemas::api::common::StatusResponse;
use crate::schemas::api::thread::{SaveThreadRequest, ThreadListResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(save_thread, load_threads, delete_thread),
    components(schemas(SaveThreadRequest, ThreadListResponse, StatusResponse))
)]
pub struct ThreadsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/save_thread", post(save_thread))
        .route("/load_threads", get(load_threads))
        .route("/delete_thread/{thread_id}", delete(delete_thread))
}

#[utoipa::path(
    post,
    path = "/api/save_thread",
    tag = "threads",
    request_body = SaveThreadRequest,
    responses(
        (status = 200, description = "Thread written", body = StatusResponse),
        (status = 400, description = "Invalid thread id or body"),
        (status = 413, description = "Body exceeds the configured size limit"),
        (status = 415, description = "Body is not `application/json`"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn save_thread(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveThreadRequest>,
) -> Result<Json<StatusResponse>, ServerError> {
    state.store.save_thread(&req.thread_id, &req.thread).await?;
    info!(thread_id = %req.thread_id, "thread saved");
    Ok(Json(StatusResponse::success()))
}

#[utoipa::path(
    get,
    path = "/api/load_threads",
    tag = "threads",
    responses(
        (status = 200, description = "All saved threads", body = ThreadListResponse),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn load_threads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ThreadListResponse>, ServerError> {
    let threads = state.store.list_threads().await?;
    info!(count = threads.len(), "threads loaded");
    Ok(Json(ThreadListResponse { threads }))
}

#[utoipa::path(
    delete,
    path = "/api/delete_thread/{thread_id}",
    tag = "threads",
    params(("thread_id" = String, Path, description = "Thread to delete")),
    responses(
        (status = 200, description = "Thread removed", body = StatusResponse),
        (status = 400, description = "Invalid thread id"),
        (status = 404, description = "No such thread"),
    )
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<StatusResponse>, ServerError> {
    state.store.delete_thread(&thread_id).await?;
    info!(%thread_id, "thread deleted");
    Ok(Json(StatusResponse::success_with(format!(
        "thread {thread_id} deleted"
    ))))
}
