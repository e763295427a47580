use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Language codes following ISO 639-1
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Entry in the supported-language table, if any
    pub fn option(&self) -> Option<&'static LanguageOption> {
        SUPPORTED_LANGUAGES.iter().find(|l| l.code == self.0)
    }

    pub fn is_supported(&self) -> bool {
        self.option().is_some()
    }

    /// NLLB-200 style code (e.g. `hin_Deva`)
    pub fn nllb_code(&self) -> Option<&'static str> {
        self.option().map(|l| l.nllb_code)
    }

    /// Target-language token expected by one-to-many opus-mt models (e.g. `>>hin<<`)
    pub fn marian_token(&self) -> Option<String> {
        self.option().map(|l| format!(">>{}<<", l.iso639_3))
    }
}

fn default_bridge_lang() -> Lang {
    Lang::new(DEFAULT_BRIDGE_LANG)
}

fn default_detect_lang() -> Lang {
    Lang::new(DEFAULT_DETECT_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A supported language
#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    /// ISO 639-1 code used on the API surface (e.g. "hi")
    pub code: &'static str,
    /// Display name (e.g. "Hindi")
    pub name: &'static str,
    /// ISO 639-3 code, used for opus-mt target tokens
    #[serde(skip)]
    pub iso639_3: &'static str,
    /// NLLB-200 code, used by multilingual models
    #[serde(skip)]
    pub nllb_code: &'static str,
}

/// Every language the router knows about, in display order.
pub const SUPPORTED_LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "en", name: "English", iso639_3: "eng", nllb_code: "eng_Latn" },
    LanguageOption { code: "hi", name: "Hindi", iso639_3: "hin", nllb_code: "hin_Deva" },
    LanguageOption { code: "bn", name: "Bengali", iso639_3: "ben", nllb_code: "ben_Beng" },
    LanguageOption { code: "ta", name: "Tamil", iso639_3: "tam", nllb_code: "tam_Taml" },
    LanguageOption { code: "te", name: "Telugu", iso639_3: "tel", nllb_code: "tel_Telu" },
    LanguageOption { code: "mr", name: "Marathi", iso639_3: "mar", nllb_code: "mar_Deva" },
    LanguageOption { code: "gu", name: "Gujarati", iso639_3: "guj", nllb_code: "guj_Gujr" },
    LanguageOption { code: "kn", name: "Kannada", iso639_3: "kan", nllb_code: "kan_Knda" },
    LanguageOption { code: "ml", name: "Malayalam", iso639_3: "mal", nllb_code: "mal_Mlym" },
    LanguageOption { code: "pa", name: "Punjabi", iso639_3: "pan", nllb_code: "pan_Guru" },
    LanguageOption { code: "ur", name: "Urdu", iso639_3: "urd", nllb_code: "urd_Arab" },
    LanguageOption { code: "or", name: "Odia", iso639_3: "ori", nllb_code: "ory_Orya" },
    LanguageOption { code: "as", name: "Assamese", iso639_3: "asm", nllb_code: "asm_Beng" },
    LanguageOption { code: "sa", name: "Sanskrit", iso639_3: "san", nllb_code: "san_Deva" },
];

pub const fn supported_languages() -> &'static [LanguageOption] {
    SUPPORTED_LANGUAGES
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|l| l.code == code)
}

/// Display name for a language code, falling back to the upper-cased code.
pub fn language_name(code: &str) -> String {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.code == code)
        .map_or_else(|| code.to_uppercase(), |l| l.name.to_string())
}

/// Bridge language for pivot translation
pub const DEFAULT_BRIDGE_LANG: &str = "en";
/// Language returned when detection has nothing to go on
pub const DEFAULT_DETECT_LANG: &str = "en";
/// Default target language for requests that don't name one
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Routing behaviour of the translation router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Intermediate language for two-hop translation
    #[serde(default = "default_bridge_lang")]
    pub bridge_lang: Lang,

    /// Fall back to pivoting through the bridge language
    #[serde(default = "default_true")]
    pub pivot: bool,

    /// Global switch for source-language detection
    #[serde(default = "default_true")]
    pub auto_detect: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            bridge_lang: default_bridge_lang(),
            pivot: true,
            auto_detect: true,
        }
    }
}

/// Model cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of models resident at once (minimum 1)
    #[serde(default = "default_max_models")]
    pub max_models: usize,
}

const fn default_max_models() -> usize {
    1
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_models: default_max_models(),
        }
    }
}

/// Language identification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Returned for empty text or when nothing else matches
    #[serde(default = "default_detect_lang")]
    pub default_lang: Lang,

    /// Enable the statistical (trigram) detector as a fallback
    #[serde(default = "default_true")]
    pub statistical: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_lang: default_detect_lang(),
            statistical: true,
        }
    }
}

/// Decoding parameters forwarded to the inference backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,
    #[serde(default = "default_no_repeat_ngram_size")]
    pub no_repeat_ngram_size: u32,
    #[serde(default = "default_true")]
    pub early_stopping: bool,
}

const fn default_max_length() -> u32 {
    512
}

const fn default_num_beams() -> u32 {
    5
}

const fn default_length_penalty() -> f32 {
    1.0
}

const fn default_no_repeat_ngram_size() -> u32 {
    3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            num_beams: default_num_beams(),
            length_penalty: default_length_penalty(),
            no_repeat_ngram_size: default_no_repeat_ngram_size(),
            early_stopping: true,
        }
    }
}

/// Inference backend configuration.
///
/// Targets a hosted inference API that serves seq2seq translation models by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl BackendConfig {
    /// Create a new backend config
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            ..Default::default()
        }
    }
}

fn default_api_base() -> String {
    "https://api-inference.huggingface.co".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Model catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// A single multilingual model (e.g. NLLB-200) used for every supported pair
    pub multilingual: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub models: ModelsConfig,
}

/// Prefix for environment overrides, e.g. `INDIC_TRANSLATE_CACHE__MAX_MODELS=2`
pub const ENV_PREFIX: &str = "INDIC_TRANSLATE";

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations, lowest precedence first:
    /// built-in defaults, ~/.config/indic-translate/config.toml, ./config.toml,
    /// then `INDIC_TRANSLATE_*` environment variables.
    pub fn load() -> Self {
        match Self::load_layered(crate::util::config_dir(), PathBuf::from("config.toml")) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load layered config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_layered(user_dir: Option<PathBuf>, local: PathBuf) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(dir) = user_dir {
            let user_config = dir.join("indic-translate").join("config.toml");
            tracing::debug!("Looking for config at {}", user_config.display());
            builder = builder.add_source(config::File::from(user_config).required(false));
        }

        let config: Self = builder
            .add_source(config::File::from(local).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the router cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_models == 0 {
            return Err(Error::ConfigInvalid {
                field: "cache.max_models".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.routing.bridge_lang.as_str().trim().is_empty() {
            return Err(Error::ConfigInvalid {
                field: "routing.bridge_lang".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.backend.retry_count == 0 {
            return Err(Error::ConfigInvalid {
                field: "backend.retry_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
