//! Translation routing: source resolution, direct and pivot attempts.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::cache::{CacheStats, ModelCache};
use crate::config::{AppConfig, DEFAULT_TARGET_LANG, Lang, RoutingConfig};
use crate::detect::{DetectionResult, LanguageIdentifier};
use crate::error::{Error, Result};
use crate::models::{ModelMapping, SupportedPair};

/// Canary text used by the health check
const HEALTH_CHECK_TEXT: &str = "Hello";
/// Canary target language used by the health check
const HEALTH_CHECK_TARGET: &str = "hi";

fn default_target() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

const fn default_true() -> bool {
    true
}

/// A single translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// Source language; detected or defaulted when absent
    #[serde(default, alias = "source_lang")]
    pub source: Option<Lang>,
    #[serde(default = "default_target", alias = "target_lang")]
    pub target: Lang,
    #[serde(default = "default_true")]
    pub auto_detect: bool,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, target: impl Into<Lang>) -> Self {
        Self {
            text: text.into(),
            source: None,
            target: target.into(),
            auto_detect: true,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<Lang>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub const fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect = auto_detect;
        self
    }
}

/// How a successful translation was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    NoTranslationNeeded,
    Direct,
    Pivot,
}

/// Why a translation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Nothing to translate
    EmptyInput,
    /// No route exists
    UnsupportedPair,
    /// A route existed but its model could not be loaded
    BackendLoad,
    /// A route existed but the model failed to produce output
    BackendInference,
}

impl FailureKind {
    fn of(err: &Error) -> Self {
        match err {
            Error::EmptyInput => Self::EmptyInput,
            Error::UnsupportedPair { .. } => Self::UnsupportedPair,
            Error::BackendLoad { .. } => Self::BackendLoad,
            // anything else raised while running a model
            _ => Self::BackendInference,
        }
    }

    /// Whether a route existed and failed while executing
    pub const fn is_execution_failure(self) -> bool {
        matches!(self, Self::BackendLoad | Self::BackendInference)
    }
}

/// Structured outcome of a translation; the router never returns an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub success: bool,
    pub translated_text: Option<String>,
    pub source_lang: Option<Lang>,
    pub target_lang: Lang,
    pub method: Option<Method>,
    pub error: Option<String>,
    pub error_kind: Option<FailureKind>,
}

impl TranslationResult {
    fn translated(text: String, source: Lang, target: Lang, method: Method) -> Self {
        Self {
            success: true,
            translated_text: Some(text),
            source_lang: Some(source),
            target_lang: target,
            method: Some(method),
            error: None,
            error_kind: None,
        }
    }

    fn failed(message: String, kind: FailureKind, source: Option<Lang>, target: Lang) -> Self {
        Self {
            success: false,
            translated_text: None,
            source_lang: source,
            target_lang: target,
            method: None,
            error: Some(message),
            error_kind: Some(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of a canary translation
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub models_loaded: usize,
    pub test_translation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Top-level orchestrator.
///
/// Owns the model cache behind an async mutex that is held for the whole
/// routing decision of a request, so requests touching the cache run one at
/// a time even when the router is shared between tasks.
pub struct TranslationRouter {
    cache: Mutex<ModelCache>,
    identifier: LanguageIdentifier,
    mapping: Arc<ModelMapping>,
    backend: Arc<dyn Backend>,
    config: RoutingConfig,
}

impl TranslationRouter {
    /// Create a router from application configuration
    pub fn new(config: &AppConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;

        let mut mapping = ModelMapping::default();
        if let Some(ref model) = config.models.multilingual {
            info!("Using multilingual model for all pairs: {}", model);
            mapping = mapping.with_multilingual(model.clone());
        }

        Self::with_parts(
            config.routing.clone(),
            config.cache.max_models,
            mapping,
            LanguageIdentifier::new(&config.detection),
            backend,
        )
    }

    /// Create a router from explicit parts
    pub fn with_parts(
        routing: RoutingConfig,
        max_models: usize,
        mapping: ModelMapping,
        identifier: LanguageIdentifier,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        let mapping = Arc::new(mapping);
        let cache = ModelCache::new(Arc::clone(&backend), Arc::clone(&mapping), max_models)?;

        info!(
            "Translation router ready: backend={}, pairs={}, max_models={}, bridge={}",
            backend.name(),
            mapping.len(),
            max_models,
            routing.bridge_lang
        );

        Ok(Self {
            cache: Mutex::new(cache),
            identifier,
            mapping,
            backend,
            config: routing,
        })
    }

    pub const fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Translate one text. Failures are reported in the result.
    pub async fn translate(&self, request: &TranslateRequest) -> TranslationResult {
        let target = request.target.clone();

        if request.text.trim().is_empty() {
            return TranslationResult::failed(
                "empty input".to_string(),
                FailureKind::EmptyInput,
                request.source.clone(),
                target,
            );
        }

        let source = self.resolve_source(request);

        if source == target {
            debug!("Source equals target ({}), returning input unchanged", source);
            return TranslationResult::translated(
                request.text.clone(),
                source,
                target,
                Method::NoTranslationNeeded,
            );
        }

        let outcome = {
            let mut cache = self.cache.lock().await;
            self.route(&mut cache, &request.text, &source, &target).await
        };

        match outcome {
            Ok((text, method)) => TranslationResult::translated(text, source, target, method),
            Err(err) => {
                let kind = FailureKind::of(&err);
                let message = if kind.is_execution_failure() {
                    format!("Translation failed for {source} -> {target}: {err}")
                } else {
                    format!("No translation model available for {source} -> {target}")
                };
                warn!("{}", message);
                TranslationResult::failed(message, kind, Some(source), target)
            }
        }
    }

    /// Translate texts one after another, preserving order
    pub async fn batch_translate(
        &self,
        texts: &[String],
        source: Option<&Lang>,
        target: &Lang,
    ) -> Vec<TranslationResult> {
        let mut results = Vec::with_capacity(texts.len());

        for text in texts {
            let request = TranslateRequest {
                text: text.clone(),
                source: source.cloned(),
                target: target.clone(),
                auto_detect: true,
            };
            results.push(self.translate(&request).await);
        }

        results
    }

    fn resolve_source(&self, request: &TranslateRequest) -> Lang {
        if let Some(ref source) = request.source {
            return source.clone();
        }

        if request.auto_detect && self.config.auto_detect {
            let detected = self.identifier.detect_default(&request.text);
            info!("Auto-detected source language: {}", detected);
            detected
        } else {
            self.config.bridge_lang.clone()
        }
    }

    async fn route(
        &self,
        cache: &mut ModelCache,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<(String, Method)> {
        let direct_err = match Self::translate_direct(cache, text, source, target).await {
            Ok(translated) => return Ok((translated, Method::Direct)),
            Err(e) => e,
        };

        if !self.pivot_allowed(source, target) {
            return Err(direct_err);
        }

        match self.translate_pivot(cache, text, source, target).await {
            Ok(translated) => Ok((translated, Method::Pivot)),
            Err(pivot_err)
                if !direct_err.is_execution_failure() && pivot_err.is_execution_failure() =>
            {
                Err(pivot_err)
            }
            Err(_) => Err(direct_err),
        }
    }

    fn pivot_allowed(&self, source: &Lang, target: &Lang) -> bool {
        let bridge = &self.config.bridge_lang;
        self.config.pivot && source != bridge && target != bridge
    }

    async fn translate_pivot(
        &self,
        cache: &mut ModelCache,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<String> {
        let bridge = &self.config.bridge_lang;
        info!("Using pivot translation: {} -> {} -> {}", source, bridge, target);

        let intermediate = Self::translate_direct(cache, text, source, bridge).await?;
        Self::translate_direct(cache, &intermediate, bridge, target).await
    }

    async fn translate_direct(
        cache: &mut ModelCache,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<String> {
        let Some(model_id) = cache.resolve_model_id(source, target).map(str::to_string) else {
            debug!("No direct model for {} -> {}", source, target);
            return Err(Error::UnsupportedPair {
                from: source.clone(),
                to: target.clone(),
            });
        };

        let model = cache.load(&model_id).await?;
        let translated = model
            .generate(text, source, target)
            .await
            .inspect_err(|e| error!("Translation error on {}: {}", model_id, e))?;

        if translated.trim().is_empty() {
            return Err(Error::BackendInference {
                model: model_id,
                reason: "model returned empty output".to_string(),
            });
        }

        Ok(translated)
    }

    /// Every directly translatable pair with its model
    pub fn supported_pairs(&self) -> Vec<SupportedPair> {
        self.mapping.pairs()
    }

    /// Detect the language of `text` using the configured default
    pub fn detect(&self, text: &str) -> Lang {
        self.identifier.detect_default(text)
    }

    pub fn language_info(&self, text: &str) -> DetectionResult {
        self.identifier.language_info(text)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Release every loaded model
    pub async fn unload_all(&self) {
        self.cache.lock().await.unload_all();
    }

    /// Run one canary translation and report readiness
    pub async fn health_check(&self) -> HealthReport {
        if !self.backend.is_available() {
            let stats = self.cache_stats().await;
            return HealthReport {
                status: HealthStatus::Unhealthy,
                models_loaded: stats.count,
                test_translation: false,
                cache: Some(stats),
                error: Some(format!("backend {} is not available", self.backend.name())),
            };
        }

        let request = TranslateRequest::new(HEALTH_CHECK_TEXT, HEALTH_CHECK_TARGET)
            .with_source(self.config.bridge_lang.clone());

        let outcome = AssertUnwindSafe(self.translate(&request)).catch_unwind().await;

        match outcome {
            Ok(result) => {
                let stats = self.cache_stats().await;
                HealthReport {
                    status: if result.success {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Degraded
                    },
                    models_loaded: stats.count,
                    test_translation: result.success,
                    cache: Some(stats),
                    error: result.error,
                }
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "health check panicked".to_string());
                error!("Health check failed: {}", message);
                let stats = self.cache_stats().await;
                HealthReport {
                    status: HealthStatus::Unhealthy,
                    models_loaded: stats.count,
                    test_translation: false,
                    cache: Some(stats),
                    error: Some(message),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendInfo, LoadedModel};
    use async_trait::async_trait;

    /// Tags text with the pair it was translated through
    #[derive(Default)]
    struct TagBackend {
        broken: Vec<&'static str>,
        silent: Vec<&'static str>,
        panics: bool,
        unavailable: bool,
    }

    struct TagModel {
        id: String,
        silent: bool,
    }

    #[async_trait]
    impl LoadedModel for TagModel {
        fn model_id(&self) -> &str {
            &self.id
        }

        async fn generate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
            if self.silent {
                return Ok("  ".to_string());
            }
            Ok(format!("[{source}->{target}] {text}"))
        }
    }

    #[async_trait]
    impl Backend for TagBackend {
        fn info(&self) -> BackendInfo {
            BackendInfo {
                name: "tag",
                requires_api_key: false,
            }
        }

        async fn construct(&self, model_id: &str) -> Result<Box<dyn LoadedModel>> {
            assert!(!self.panics, "boom");
            if self.broken.iter().any(|b| *b == model_id) {
                return Err(Error::BackendLoad {
                    model: model_id.to_string(),
                    reason: "weights missing".to_string(),
                });
            }
            Ok(Box::new(TagModel {
                id: model_id.to_string(),
                silent: self.silent.iter().any(|s| *s == model_id),
            }))
        }

        fn is_available(&self) -> bool {
            !self.unavailable
        }
    }

    fn router_with(backend: TagBackend, routing: RoutingConfig) -> TranslationRouter {
        let mapping = ModelMapping::from_pairs([
            ("hi", "en", "hi-en"),
            ("en", "ta", "en-ta"),
            ("ta", "en", "ta-en"),
            ("bn", "en", "bn-en"),
        ]);
        TranslationRouter::with_parts(
            routing,
            1,
            mapping,
            LanguageIdentifier::with_detector(Lang::new("en"), None),
            Arc::new(backend),
        )
        .unwrap()
    }

    fn router() -> TranslationRouter {
        router_with(TagBackend::default(), RoutingConfig::default())
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = router().translate(&TranslateRequest::new("  \n", "en")).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("empty input"));
        assert_eq!(result.error_kind, Some(FailureKind::EmptyInput));
    }

    #[tokio::test]
    async fn test_same_language_is_exact_passthrough() {
        let router = router();
        let text = "  नमस्ते\tदुनिया  ";
        let result = router
            .translate(&TranslateRequest::new(text, "hi").with_source("hi"))
            .await;
        assert!(result.success);
        assert_eq!(result.translated_text.as_deref(), Some(text));
        assert_eq!(result.method, Some(Method::NoTranslationNeeded));
        assert_eq!(router.cache_stats().await.count, 0);
    }

    #[tokio::test]
    async fn test_direct_with_detection() {
        let result = router().translate(&TranslateRequest::new("नमस्ते दुनिया", "en")).await;
        assert!(result.success);
        assert_eq!(result.source_lang, Some(Lang::new("hi")));
        assert_eq!(result.method, Some(Method::Direct));
        assert_eq!(result.translated_text.as_deref(), Some("[hi->en] नमस्ते दुनिया"));
    }

    #[tokio::test]
    async fn test_no_detect_defaults_to_bridge() {
        let request = TranslateRequest::new("नमस्ते", "ta").with_auto_detect(false);
        let result = router().translate(&request).await;
        assert_eq!(result.source_lang, Some(Lang::new("en")));
        assert_eq!(result.method, Some(Method::Direct));
    }

    #[tokio::test]
    async fn test_global_auto_detect_switch() {
        let routing = RoutingConfig {
            auto_detect: false,
            ..Default::default()
        };
        let router = router_with(TagBackend::default(), routing);
        let result = router.translate(&TranslateRequest::new("নমস্কার", "en")).await;
        // defaulted to the bridge language, so nothing to translate
        assert_eq!(result.source_lang, Some(Lang::new("en")));
        assert_eq!(result.method, Some(Method::NoTranslationNeeded));
    }

    #[tokio::test]
    async fn test_pivot_composes_both_legs() {
        let result = router()
            .translate(&TranslateRequest::new("नमस्ते", "ta").with_source("hi"))
            .await;
        assert!(result.success);
        assert_eq!(result.method, Some(Method::Pivot));
        assert_eq!(
            result.translated_text.as_deref(),
            Some("[en->ta] [hi->en] नमस्ते")
        );
    }

    #[tokio::test]
    async fn test_pivot_disabled() {
        let routing = RoutingConfig {
            pivot: false,
            ..Default::default()
        };
        let result = router_with(TagBackend::default(), routing)
            .translate(&TranslateRequest::new("नमस्ते", "ta").with_source("hi"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(FailureKind::UnsupportedPair));
    }

    #[tokio::test]
    async fn test_pivot_fails_without_second_leg() {
        let result = router()
            .translate(&TranslateRequest::new("নমস্কার", "ml").with_source("bn"))
            .await;
        assert!(!result.success);
        assert_eq!(result.translated_text, None);
        assert_eq!(result.error_kind, Some(FailureKind::UnsupportedPair));
        assert_eq!(
            result.error.as_deref(),
            Some("No translation model available for bn -> ml")
        );
        assert_eq!(result.source_lang, Some(Lang::new("bn")));
        assert_eq!(result.target_lang, Lang::new("ml"));
    }

    #[tokio::test]
    async fn test_no_pivot_when_bridge_is_an_endpoint() {
        // en -> bn has no model and en is the bridge
        let result = router()
            .translate(&TranslateRequest::new("hello", "bn").with_source("en"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(FailureKind::UnsupportedPair));
    }

    #[tokio::test]
    async fn test_unsupported_source_flows_through() {
        let result = router()
            .translate(&TranslateRequest::new("bonjour", "en").with_source("fr"))
            .await;
        assert!(!result.success);
        assert_eq!(result.source_lang, Some(Lang::new("fr")));
        assert_eq!(result.error_kind, Some(FailureKind::UnsupportedPair));
    }

    #[tokio::test]
    async fn test_load_failure_is_contained() {
        let backend = TagBackend {
            broken: vec!["hi-en"],
            ..Default::default()
        };
        let result = router_with(backend, RoutingConfig::default())
            .translate(&TranslateRequest::new("नमस्ते", "en").with_source("hi"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(FailureKind::BackendLoad));
        assert!(result.error.unwrap().starts_with("Translation failed for hi -> en"));
    }

    #[tokio::test]
    async fn test_pivot_leg_failure_reported_as_execution_failure() {
        let backend = TagBackend {
            broken: vec!["en-ta"],
            ..Default::default()
        };
        let result = router_with(backend, RoutingConfig::default())
            .translate(&TranslateRequest::new("नमस्ते", "ta").with_source("hi"))
            .await;
        assert!(!result.success);
        assert_eq!(result.translated_text, None);
        assert_eq!(result.error_kind, Some(FailureKind::BackendLoad));
    }

    #[tokio::test]
    async fn test_empty_output_is_inference_failure() {
        let backend = TagBackend {
            silent: vec!["hi-en"],
            ..Default::default()
        };
        let result = router_with(backend, RoutingConfig::default())
            .translate(&TranslateRequest::new("नमस्ते", "en").with_source("hi"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(FailureKind::BackendInference));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_length() {
        let router = router();
        let texts = vec!["नमस्ते".to_string(), String::new(), "வணக்கம்".to_string()];
        let results = router.batch_translate(&texts, None, &Lang::new("en")).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].translated_text.as_deref(), Some("[hi->en] नमस्ते"));
        assert_eq!(results[1].error_kind, Some(FailureKind::EmptyInput));
        assert_eq!(results[2].translated_text.as_deref(), Some("[ta->en] வணக்கம்"));

        assert!(router.batch_translate(&[], None, &Lang::new("en")).await.is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let router = router();
        // no en -> hi model in this mapping
        let report = router.health_check().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.test_translation);

        let mapping = ModelMapping::from_pairs([("en", "hi", "en-hi")]);
        let router = TranslationRouter::with_parts(
            RoutingConfig::default(),
            1,
            mapping,
            LanguageIdentifier::with_detector(Lang::new("en"), None),
            Arc::new(TagBackend::default()),
        )
        .unwrap();
        let report = router.health_check().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.test_translation);
        assert_eq!(report.models_loaded, 1);
    }

    #[tokio::test]
    async fn test_health_check_unavailable_reports_resident_models() {
        let backend = TagBackend {
            unavailable: true,
            ..Default::default()
        };
        let router = router_with(backend, RoutingConfig::default());
        let result = router
            .translate(&TranslateRequest::new("नमस्ते", "en").with_source("hi"))
            .await;
        assert!(result.success);

        let report = router.health_check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.error.as_deref(), Some("backend tag is not available"));
        assert_eq!(report.models_loaded, 1);
        assert_eq!(report.cache.map(|c| c.model_ids), Some(vec!["hi-en".to_string()]));
    }

    #[tokio::test]
    async fn test_health_check_survives_backend_panic() {
        let mapping = ModelMapping::from_pairs([("en", "hi", "en-hi")]);
        let backend = TagBackend {
            panics: true,
            ..Default::default()
        };
        let router = TranslationRouter::with_parts(
            RoutingConfig::default(),
            1,
            mapping,
            LanguageIdentifier::with_detector(Lang::new("en"), None),
            Arc::new(backend),
        )
        .unwrap();

        let report = router.health_check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.test_translation);
        assert_eq!(report.error.as_deref(), Some("boom"));
        assert_eq!(report.models_loaded, 0);

        // the cache lock was released during unwinding
        let stats = router.cache_stats().await;
        assert_eq!(stats.count, 0);
        let result = router
            .translate(&TranslateRequest::new("hello", "en").with_source("en"))
            .await;
        assert_eq!(result.method, Some(Method::NoTranslationNeeded));
    }

    #[test]
    fn test_request_accepts_api_field_names() {
        let json = r#"{"text": "hi there", "source_lang": "en", "target_lang": "hi"}"#;
        let request: TranslateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.source, Some(Lang::new("en")));
        assert_eq!(request.target, Lang::new("hi"));
        assert!(request.auto_detect);

        let request: TranslateRequest = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert_eq!(request.target, Lang::new("en"));
        assert_eq!(request.source, None);
    }
}
