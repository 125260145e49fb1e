use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ThreadDocument;

/// Request body for `POST /api/save_thread`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveThreadRequest {
    /// Opaque id; also the file name stem on disk.
    pub thread_id: String,
    /// Stored verbatim. Must be a JSON object.
    #[schema(value_type = Object)]
    pub thread: ThreadDocument,
}

/// Response body for `GET /api/load_threads`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadListResponse {
    #[schema(value_type = Vec<Object>)]
    pub threads: Vec<ThreadDocument>,
}
