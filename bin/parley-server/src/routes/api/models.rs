//! Model configuration endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::{ModelConfig, ModelStore};
use crate::error::ServerError;
use crate::routes::ApiJson;
use crate::schemas::api::common::StatusResponse;
use crate::schemas::api::model::{ModelListResponse, SaveModelsRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(load_models, save_models),
    components(schemas(ModelConfig, ModelListResponse, SaveModelsRequest, StatusResponse))
)]
pub struct ModelsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/load_models", get(load_models))
        .route("/save_models", post(save_models))
}

/// The saved model list, or a single built-in default when none exists yet.
#[utoipa::path(
    get,
    path = "/api/load_models",
    tag = "models",
    responses(
        (status = 200, description = "Model configurations", body = ModelListResponse),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn load_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelListResponse>, ServerError> {
    let models = state.store.load_models().await?;
    Ok(Json(ModelListResponse { models }))
}

/// Replace the model list wholesale.
#[utoipa::path(
    post,
    path = "/api/save_models",
    tag = "models",
    request_body = SaveModelsRequest,
    responses(
        (status = 200, description = "Model list replaced", body = StatusResponse),
        (status = 400, description = "`models` missing or malformed"),
        (status = 413, description = "Body exceeds the configured size limit"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn save_models(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveModelsRequest>,
) -> Result<Json<StatusResponse>, ServerError> {
    let models = req
        .models
        .ok_or_else(|| ServerError::BadRequest("no model data provided".into()))?;
    let count = models.len();
    state.store.save_models(models).await?;
    info!(count, "model list saved");
    Ok(Json(StatusResponse::success()))
}

#[cfg(test)]
mod test {
    use crate::routes::test_support::harness;
    use crate::upstream::stub::ScriptedUpstream;
    use axum::http::StatusCode;
    use serde_json::json;

    fn custom_model() -> serde_json::Value {
        json!({
            "id": "42",
            "name": "Terse",
            "baseModel": "anthropic/claude-3-haiku",
            "systemPrompt": "Answer in one line.",
            "temperature": 0.3,
            "maxTokens": 128
        })
    }

    #[tokio::test]
    async fn empty_store_serves_default_model() {
        let h = harness(ScriptedUpstream::default()).await;
        let (status, body) = h.get_json("/api/load_models").await;
        assert_eq!(status, StatusCode::OK);
        let models = body["models"].as_array().unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0]["baseModel"], "gpt-4o-mini");
        assert_eq!(models[0]["id"], "1");
    }

    #[tokio::test]
    async fn save_then_load_returns_exactly_saved_list() {
        let h = harness(ScriptedUpstream::default()).await;
        let (status, body) = h
            .post_json("/api/save_models", json!({ "models": [custom_model()] }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success" }));

        let (_, body) = h.get_json("/api/load_models").await;
        assert_eq!(body, json!({ "models": [custom_model()] }));
    }

    #[tokio::test]
    async fn save_replaces_rather_than_merges() {
        let h = harness(ScriptedUpstream::default()).await;
        let mut first = custom_model();
        first["id"] = json!("7");
        h.post_json("/api/save_models", json!({ "models": [first] }))
            .await;
        h.post_json("/api/save_models", json!({ "models": [custom_model()] }))
            .await;

        let (_, body) = h.get_json("/api/load_models").await;
        assert_eq!(body, json!({ "models": [custom_model()] }));
    }

    #[tokio::test]
    async fn missing_models_field_is_400_and_keeps_state() {
        let h = harness(ScriptedUpstream::default()).await;
        h.post_json("/api/save_models", json!({ "models": [custom_model()] }))
            .await;

        let (status, body) = h
            .post_json("/api/save_models", json!({ "model": [] }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no model data provided");

        let (_, body) = h.get_json("/api/load_models").await;
        assert_eq!(body, json!({ "models": [custom_model()] }));
    }

    #[tokio::test]
    async fn missing_models_field_on_empty_store_keeps_default() {
        let h = harness(ScriptedUpstream::default()).await;
        let (status, _) = h.post_json("/api/save_models", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = h.get_json("/api/load_models").await;
        assert_eq!(body["models"].as_array().unwrap().len(), 1);
        assert_eq!(body["models"][0]["baseModel"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn malformed_model_entry_is_400() {
        let h = harness(ScriptedUpstream::default()).await;
        let (status, _) = h
            .post_json("/api/save_models", json!({ "models": [{ "id": "1" }] }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
