use async_trait::async_trait;
use crate::config::Lang;
use crate::error::Result;

/// Information about an inference backend
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this backend requires an API key
    pub requires_api_key: bool,
}

/// A loaded, invocation-ready translation model.
///
/// Expensive to construct, cheap to invoke repeatedly. Instances are owned
/// by the model cache and dropped on eviction.
#[async_trait]
pub trait LoadedModel: Send + Sync {
    /// Identifier this model was constructed from
    fn model_id(&self) -> &str;

    /// Translate text from source language to target language
    async fn generate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String>;
}

/// Trait for inference backends that construct models by id
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get information about this backend
    fn info(&self) -> BackendInfo;

    /// Get the backend name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Construct a model handle; fails with `Error::BackendLoad`
    async fn construct(&self, model_id: &str) -> Result<Box<dyn LoadedModel>>;

    /// Check if the backend is usable at all (e.g., credentials configured)
    fn is_available(&self) -> bool {
        true
    }
}
