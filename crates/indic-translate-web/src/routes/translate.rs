//! Translation routes - single text and batch.

use axum::{Json, extract::State, http::StatusCode};
use indic_translate_core::{DEFAULT_TARGET_LANG, Lang, TranslateRequest, TranslationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::helpers::{RouteResult, status_for, validate_batch, validate_text};
use crate::state::AppState;

fn default_target() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

/// Body of `/batch-translate`.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(default, alias = "source_lang")]
    pub source: Option<Lang>,
    #[serde(default = "default_target", alias = "target_lang")]
    pub target: Lang,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<TranslationResult>,
    pub count: usize,
}

/// Translate one text.
///
/// The body is always the translation result; the status code tells
/// "no route" (400) apart from "route failed while running" (502).
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> RouteResult<(StatusCode, Json<TranslationResult>)> {
    validate_text(&request.text)?;

    debug!(
        "translate: chars={}, source={:?}, target={}",
        request.text.chars().count(),
        request.source,
        request.target
    );

    let result = state.router.translate(&request).await;
    Ok((status_for(&result), Json(result)))
}

/// Translate up to 50 texts sequentially, preserving order.
pub async fn batch_translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> RouteResult<Json<BatchResponse>> {
    validate_batch(request.texts.len())?;

    info!("Batch translating {} texts to {}", request.texts.len(), request.target);

    let results = state
        .router
        .batch_translate(&request.texts, request.source.as_ref(), &request.target)
        .await;

    Ok(Json(BatchResponse {
        count: results.len(),
        results,
    }))
}
