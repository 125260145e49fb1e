use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ModelConfig;

/// Request body for `POST /api/save_models`. A missing (or `null`) `models`
/// field is rejected by the handler rather than the extractor so it can be
/// reported as a plain 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SaveModelsRequest {
    #[serde(default)]
    pub models: Option<Vec<ModelConfig>>,
}

/// Response body for `GET /api/load_models`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelListResponse {
    pub models: Vec<ModelConfig>,
}
