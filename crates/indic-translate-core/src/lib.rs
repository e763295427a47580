//! Indic Translate Core Library
//!
//! This library provides the translation orchestration layer for Indian languages:
//! - Language identification (Unicode scripts, statistical detection, Hinglish)
//! - Bounded model cache with least-recently-used eviction
//! - Translation routing with same-language short-circuit and pivot fallback
//! - Model inference via a Hugging Face style inference API

pub mod backend;
pub mod cache;
pub mod config;
pub mod detect;
pub mod error;
pub mod models;
pub mod router;
pub mod util;

pub use backend::{Backend, BackendInfo, InferenceApiBackend, LoadedModel, create_backend};
pub use cache::{CacheStats, ModelCache};
pub use config::{
    AppConfig, Lang, LanguageOption, language_name, supported_languages,
    DEFAULT_BRIDGE_LANG, DEFAULT_DETECT_LANG, DEFAULT_TARGET_LANG,
};
pub use detect::{Confidence, DetectionResult, LanguageIdentifier};
pub use error::{Error, Result};
pub use models::{LanguagePair, ModelMapping, SupportedPair};
pub use router::{
    FailureKind, HealthReport, HealthStatus, Method, TranslateRequest, TranslationResult,
    TranslationRouter,
};

/// Build a router and its backend from configuration
pub fn build_router(config: &AppConfig) -> Result<TranslationRouter> {
    let backend = create_backend(&config.backend, &config.models)?;
    TranslationRouter::new(config, backend)
}
