//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document (disable with `PARLEY_ENABLE_OPENAPI=false`)
//! - The `/api` routes: connectivity probe, threads, models and chat

mod api;
pub mod doc;
mod extract;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{self},
    Router,
};
use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;

pub use extract::ApiJson;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new().nest("/api", api::router());

    if state.config.enable_openapi {
        app = app.merge(doc::router());
    }

    app
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}


#[cfg(test)]
mod test {
    use super::test_support::harness;
    use crate::upstream::stub::ScriptedUpstream;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn responses_carry_trace_id() {
        let h = harness(ScriptedUpstream::default()).await;
        let trace_id = "7f1c8a52-9c1e-4c43-a8a5-0b7f2d1e6a90";
        let response = h
            .send(
                Request::get("/api/connect")
                    .header("x-trace-id", trace_id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-trace-id"], trace_id);
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let h = harness(ScriptedUpstream::default()).await;
        let response = h
            .send(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_lists_endpoints() {
        let h = harness(ScriptedUpstream::default()).await;
        let (status, doc) = h.get_json("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        for path in [
            "/api/connect",
            "/api/save_thread",
            "/api/load_threads",
            "/api/delete_thread/{thread_id}",
            "/api/load_models",
            "/api/save_models",
            "/api/chat",
        ] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
    }
}
