//! HTTP route handlers for the translation API.
//!
//! All routes exchange JSON. Validation failures return a plain-text 400.

mod health;
mod info;
mod translate;

pub use health::{health, models, unload_models};
pub use info::{index, languages, translation_pairs};
pub use translate::{batch_translate, translate};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

/// Build the API router without middleware
pub fn api(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/translate", post(translate))
        .route("/batch-translate", post(batch_translate))
        .route("/languages", get(languages))
        .route("/translation-pairs", get(translation_pairs))
        .route("/health", get(health))
        .route("/models", get(models))
        .route("/models/unload", post(unload_models))
        .with_state(state)
}
