//! Informational routes - service description, languages, pairs.

use axum::{Json, extract::State};
use indic_translate_core::{LanguageOption, SupportedPair, supported_languages};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [LanguageOption],
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PairsResponse {
    pub pairs: Vec<SupportedPair>,
    pub count: usize,
}

/// Service description with the list of endpoints.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "name": "indic-translate",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Translation for Indian languages",
        "backend": state.router.backend_name(),
        "endpoints": {
            "translate": "/translate",
            "batch": "/batch-translate",
            "languages": "/languages",
            "pairs": "/translation-pairs",
            "health": "/health",
            "models": "/models",
        },
    }))
}

pub async fn languages() -> Json<LanguagesResponse> {
    let languages = supported_languages();
    Json(LanguagesResponse {
        languages,
        count: languages.len(),
    })
}

pub async fn translation_pairs(State(state): State<Arc<AppState>>) -> Json<PairsResponse> {
    let pairs = state.router.supported_pairs();
    Json(PairsResponse {
        count: pairs.len(),
        pairs,
    })
}
