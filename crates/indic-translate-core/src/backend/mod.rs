mod traits;
mod inference;

pub use traits::{Backend, BackendInfo, LoadedModel};
pub use inference::InferenceApiBackend;

use crate::config::{BackendConfig, ModelsConfig};
use crate::error::Result;
use std::sync::Arc;

/// Create a backend from configuration
pub fn create_backend(config: &BackendConfig, models: &ModelsConfig) -> Result<Arc<dyn Backend>> {
    let backend = InferenceApiBackend::new(config, models.multilingual.clone())?;

    Ok(Arc::new(backend))
}
