//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::FileStore;
use crate::upstream::ChatUpstream;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env and CLI derived).
    pub config: Arc<Config>,
    /// Thread documents and the model list.
    pub store: Arc<FileStore>,
    /// Chat-completion provider the `/api/chat` endpoint proxies to.
    pub upstream: Arc<dyn ChatUpstream>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
