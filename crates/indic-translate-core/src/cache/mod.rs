//! Bounded cache of loaded models with least-recently-used eviction.

use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::backend::{Backend, LoadedModel};
use crate::config::Lang;
use crate::error::{Error, Result};
use crate::models::ModelMapping;

/// Snapshot of the cache contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of resident models
    pub count: usize,
    /// Resident model ids, least recently used first
    pub model_ids: Vec<String>,
    /// Maximum number of resident models
    pub capacity: usize,
}

/// Owns every loaded model handle.
///
/// At most `capacity` models are resident at any time, including while a
/// new model is being constructed: the least recently used entry is evicted
/// before construction starts. All mutating methods take `&mut self`; a
/// caller sharing the cache must serialize access (one writer at a time).
pub struct ModelCache {
    backend: Arc<dyn Backend>,
    mapping: Arc<ModelMapping>,
    models: LruCache<String, Box<dyn LoadedModel>>,
    capacity: NonZeroUsize,
}

impl ModelCache {
    /// Create an empty cache. `capacity` must be at least 1.
    pub fn new(
        backend: Arc<dyn Backend>,
        mapping: Arc<ModelMapping>,
        capacity: usize,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| Error::ConfigInvalid {
            field: "cache.max_models".to_string(),
            reason: "must be at least 1".to_string(),
        })?;

        Ok(Self {
            backend,
            mapping,
            models: LruCache::new(capacity),
            capacity,
        })
    }

    /// Model id serving the pair, if any. No side effects.
    pub fn resolve_model_id(&self, source: &Lang, target: &Lang) -> Option<&str> {
        self.mapping.resolve(source, target)
    }

    /// Get a loaded model, constructing it on a miss.
    ///
    /// A hit promotes the entry to most recently used. On a miss the least
    /// recently used entry is evicted first if the cache is full. If
    /// construction fails nothing is inserted and the error is returned.
    pub async fn load(&mut self, model_id: &str) -> Result<&dyn LoadedModel> {
        if self.models.contains(model_id) {
            debug!("Using cached model: {}", model_id);
        } else {
            self.evict_for_insert();

            info!("Loading model: {}", model_id);
            let model = self
                .backend
                .construct(model_id)
                .await
                .inspect_err(|e| error!("Failed to load model {}: {}", model_id, e))?;

            self.models.put(model_id.to_string(), model);
            info!("Successfully loaded model: {}", model_id);
        }

        // get() promotes to most recently used
        self.models
            .get(model_id)
            .map(|model| &**model)
            .ok_or_else(|| Error::BackendLoad {
                model: model_id.to_string(),
                reason: "model missing from cache after load".to_string(),
            })
    }

    fn evict_for_insert(&mut self) {
        while self.models.len() >= self.capacity.get() {
            let Some((model_id, model)) = self.models.pop_lru() else {
                break;
            };
            info!("Evicting model from memory: {}", model_id);
            drop(model);
        }
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains(model_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Release every model. Safe to call on an empty cache.
    pub fn unload_all(&mut self) {
        if !self.models.is_empty() {
            info!("Unloading all models ({})", self.models.len());
        }
        self.models.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            count: self.models.len(),
            model_ids: self.models.iter().rev().map(|(id, _)| id.clone()).collect(),
            capacity: self.capacity.get(),
        }
    }
}
