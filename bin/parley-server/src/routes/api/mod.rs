pub mod chat;
pub mod connect;
pub mod models;
pub mod threads;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(connect::router())
        .merge(threads::router())
        .merge(models::router())
        .merge(chat::router())
}

#[derive(OpenApi)]
#[openapi()]
pub struct Api;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = Api::openapi();
    doc.merge(connect::ConnectApi::openapi());
    doc.merge(threads::ThreadsApi::openapi());
    doc.merge(models::ModelsApi::openapi());
    doc.merge(chat::ChatApi::openapi());

    doc
}
