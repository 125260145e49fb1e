use std::future::Future;

use tracing::debug;

use crate::entities::dao::model::dedupe_last_wins;
use crate::entities::{read_json, FileStore, ModelConfig, StoreError};

pub trait ModelStore: Send + Sync + 'static {
    /// The saved model list, or the built-in default when none was saved yet.
    fn load_models(&self) -> impl Future<Output = Result<Vec<ModelConfig>, StoreError>> + Send;

    /// Replace the whole list. Repeated ids collapse, last entry wins.
    fn save_models(
        &self,
        models: Vec<ModelConfig>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl ModelStore for FileStore {
    async fn load_models(&self) -> Result<Vec<ModelConfig>, StoreError> {
        match read_json::<Vec<ModelConfig>>(&self.models_path()).await? {
            Some(models) => Ok(models),
            None => Ok(vec![ModelConfig::default()]),
        }
    }

    async fn save_models(&self, models: Vec<ModelConfig>) -> Result<(), StoreError> {
        let submitted = models.len();
        let models = dedupe_last_wins(models);
        if models.len() < submitted {
            debug!(
                submitted,
                kept = models.len(),
                "repeated model ids collapsed, last entry wins"
            );
        }
        self.write_json(&self.models_path(), &models)
            .await?;
        debug!(count = models.len(), "model list saved");
        Ok(())
    }
}
