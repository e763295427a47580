use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::traits::{Backend, BackendInfo, LoadedModel};
use crate::config::{BackendConfig, GenerationConfig, Lang};
use crate::error::{Error, Result};

/// Wait when a 429 response carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;
/// Upper bound on a server-requested rate-limit wait
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Hosted inference API backend.
///
/// Speaks the Hugging Face Inference API shape: model availability via
/// `GET {api_base}/status/{model}` and translation via
/// `POST {api_base}/models/{model}`. Any server exposing the same two
/// endpoints (e.g. a self-hosted gateway) works.
pub struct InferenceApiBackend {
    client: Client,
    /// Base URL for the API
    pub api_base: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Decoding parameters sent with each request
    pub generation: GenerationConfig,
    /// Number of attempts per inference call
    pub retry_count: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// Model id that takes NLLB language codes
    pub multilingual: Option<String>,
}

/// How a model expects to be told which languages it is translating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelKind {
    /// Dedicated single-pair model, nothing extra
    Pair,
    /// One-to-many opus-mt model, needs a `>>xxx<<` target token
    OneToMany,
    /// Multilingual model, needs `src_lang`/`tgt_lang` parameters
    Multilingual,
}

impl ModelKind {
    fn of(model_id: &str, multilingual: Option<&str>) -> Self {
        if multilingual == Some(model_id) {
            Self::Multilingual
        } else if model_id.ends_with("-mul") {
            Self::OneToMany
        } else {
            Self::Pair
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelStatus {
    #[serde(default)]
    loaded: bool,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: Parameters,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_length: u32,
    num_beams: u32,
    length_penalty: f32,
    no_repeat_ngram_size: u32,
    early_stopping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_lang: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tgt_lang: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

fn authorize(req: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => req.header("Authorization", format!("Bearer {key}")),
        None => req,
    }
}

impl InferenceApiBackend {
    /// Create a backend from configuration
    pub fn new(config: &BackendConfig, multilingual: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "backend".to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            generation: config.generation.clone(),
            retry_count: config.retry_count.max(1),
            retry_delay_ms: config.retry_delay_ms,
            multilingual,
        })
    }
}

#[async_trait]
impl Backend for InferenceApiBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "Inference API",
            requires_api_key: false, // Optional for self-hosted servers
        }
    }

    async fn construct(&self, model_id: &str) -> Result<Box<dyn LoadedModel>> {
        let load_error = |reason: String| Error::BackendLoad {
            model: model_id.to_string(),
            reason,
        };

        let url = format!("{}/status/{}", self.api_base, model_id);
        debug!("Checking model status at {}", url);

        let response = authorize(self.client.get(&url), self.api_key.as_deref())
            .send()
            .await
            .map_err(|e| load_error(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(load_error("model not found".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(load_error(format!("HTTP {status}: {body}")));
        }

        let model_status: ModelStatus = response
            .json()
            .await
            .map_err(|e| load_error(format!("invalid status response: {e}")))?;

        debug!(
            "Model {} status: loaded={}, state={:?}",
            model_id, model_status.loaded, model_status.state
        );

        Ok(Box::new(InferenceModel {
            client: self.client.clone(),
            url: format!("{}/models/{}", self.api_base, model_id),
            api_key: self.api_key.clone(),
            model_id: model_id.to_string(),
            kind: ModelKind::of(model_id, self.multilingual.as_deref()),
            generation: self.generation.clone(),
            retry_count: self.retry_count,
            retry_delay_ms: self.retry_delay_ms,
        }))
    }

    fn is_available(&self) -> bool {
        !self.api_base.is_empty()
    }
}

/// Handle to a model served by the inference API
struct InferenceModel {
    client: Client,
    url: String,
    api_key: Option<String>,
    model_id: String,
    kind: ModelKind,
    generation: GenerationConfig,
    retry_count: u32,
    retry_delay_ms: u64,
}

/// How long to back off after a 429, capped at `MAX_RETRY_AFTER_SECS`
fn rate_limit_wait(retry_after: Option<u64>) -> Duration {
    Duration::from_secs(
        retry_after
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
            .min(MAX_RETRY_AFTER_SECS),
    )
}

impl InferenceModel {
    fn inference_error(&self, reason: impl Into<String>) -> Error {
        Error::BackendInference {
            model: self.model_id.clone(),
            reason: reason.into(),
        }
    }

    fn unsupported_language(&self, lang: &Lang) -> Error {
        self.inference_error(format!("language {lang} not supported by multilingual model"))
    }

    /// Build the request body for this model kind
    fn build_request(&self, text: &str, source: &Lang, target: &Lang) -> Result<InferenceRequest> {
        let (inputs, src_lang, tgt_lang) = match self.kind {
            ModelKind::Pair => (text.to_string(), None, None),
            ModelKind::OneToMany => {
                let token = target.marian_token().ok_or_else(|| {
                    self.inference_error(format!("no target token for language {target}"))
                })?;
                (format!("{token} {text}"), None, None)
            }
            ModelKind::Multilingual => {
                let src = source
                    .nllb_code()
                    .ok_or_else(|| self.unsupported_language(source))?;
                let tgt = target
                    .nllb_code()
                    .ok_or_else(|| self.unsupported_language(target))?;
                (text.to_string(), Some(src), Some(tgt))
            }
        };

        Ok(InferenceRequest {
            inputs,
            parameters: Parameters {
                max_length: self.generation.max_length,
                num_beams: self.generation.num_beams,
                length_penalty: self.generation.length_penalty,
                no_repeat_ngram_size: self.generation.no_repeat_ngram_size,
                early_stopping: self.generation.early_stopping,
                src_lang,
                tgt_lang,
            },
            options: Options {
                wait_for_model: true,
            },
        })
    }

    /// Make API request with retry logic
    async fn request_with_retry(&self, request: &InferenceRequest) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.retry_count {
            debug!(
                "Inference request attempt {}/{} to {}",
                attempt + 1,
                self.retry_count,
                self.url
            );

            let req = authorize(self.client.post(&self.url).json(request), self.api_key.as_deref());

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.json::<Vec<TranslationOutput>>().await {
                            Ok(outputs) => {
                                if let Some(output) = outputs.into_iter().next() {
                                    return Ok(output.translation_text.trim().to_string());
                                }
                                last_error = Some(self.inference_error("no outputs in response"));
                            }
                            Err(e) => {
                                warn!("Failed to parse response: {}", e);
                                last_error = Some(self.inference_error(e.to_string()));
                            }
                        }
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok());

                        warn!("Rate limited, retry after {:?}s", retry_after);
                        last_error = Some(self.inference_error("rate limited"));

                        // Wait longer on rate limit
                        if attempt + 1 < self.retry_count {
                            tokio::time::sleep(rate_limit_wait(retry_after)).await;
                        }
                        continue;
                    } else if status == StatusCode::SERVICE_UNAVAILABLE {
                        debug!("Model {} is still warming up", self.model_id);
                        last_error = Some(self.inference_error("model is loading"));
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        warn!("API error: {} - {}", status, body);
                        last_error = Some(self.inference_error(format!("HTTP {status}: {body}")));
                    }
                }
                Err(e) => {
                    warn!("Request failed: {}", e);
                    let reason = if e.is_timeout() {
                        "request timed out".to_string()
                    } else {
                        e.to_string()
                    };
                    last_error = Some(self.inference_error(reason));
                }
            }

            // Wait before retry
            if attempt + 1 < self.retry_count {
                tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
            }
        }

        error!("Inference failed after {} attempts", self.retry_count);
        Err(last_error.unwrap_or_else(|| self.inference_error("maximum retries exceeded")))
    }
}

#[async_trait]
impl LoadedModel for InferenceModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        let request = self.build_request(text, source, target)?;
        self.request_with_retry(&request).await
    }
}
