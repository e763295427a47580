//! Health and model-cache routes.

use axum::{Json, extract::State, http::StatusCode};
use indic_translate_core::{CacheStats, HealthReport, HealthStatus, supported_languages};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub report: HealthReport,
    pub supported_languages: usize,
}

/// Run the canary translation. Unhealthy maps to 503.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.router.health_check().await;
    let status = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(HealthResponse {
            report,
            supported_languages: supported_languages().len(),
        }),
    )
}

/// Resident models, least recently used first.
pub async fn models(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.router.cache_stats().await)
}

pub async fn unload_models(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    info!("Unloading all models on request");
    state.router.unload_all().await;
    Json(state.router.cache_stats().await)
}
