//! Source-language identification.
//!
//! Rules are applied in strict precedence order, first match wins:
//! 1. empty or whitespace-only text gives the default language
//! 2. Latin mixed with Devanagari (code-switched Hinglish) gives `hi`
//! 3. the script classifier's winner
//! 4. the statistical detector, if enabled and its answer is supported
//! 5. any Latin letter gives English
//! 6. the default language

mod script;
mod statistical;

pub use script::{DEVANAGARI, SCRIPT_RANGES, ScriptClassifier, ScriptCounts, ScriptRange};
pub use statistical::{FreeformDetector, WhatlangDetector};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{self, DetectionConfig, Lang};
use crate::util::has_latin;

/// Language assumed for Latin-script text
pub const LATIN_LANG: &str = "en";

/// How much the detection can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The script classifier matched
    High,
    Medium,
}

/// Outcome of a detailed detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    pub detected_language: Lang,
    pub is_mixed_script: bool,
    pub confidence: Confidence,
}

/// Combines script heuristics and a statistical detector. Never fails.
pub struct LanguageIdentifier {
    classifier: ScriptClassifier,
    statistical: Option<Box<dyn FreeformDetector>>,
    default_lang: Lang,
}

impl LanguageIdentifier {
    /// Create an identifier from configuration
    pub fn new(config: &DetectionConfig) -> Self {
        let statistical: Option<Box<dyn FreeformDetector>> = if config.statistical {
            Some(Box::new(WhatlangDetector::new()))
        } else {
            None
        };

        Self::with_detector(config.default_lang.clone(), statistical)
    }

    /// Create with a custom statistical detector (or none)
    pub fn with_detector(
        default_lang: Lang,
        statistical: Option<Box<dyn FreeformDetector>>,
    ) -> Self {
        Self {
            classifier: ScriptClassifier::new(),
            statistical,
            default_lang,
        }
    }

    pub const fn default_lang(&self) -> &Lang {
        &self.default_lang
    }

    /// True if the text mixes Latin letters with Devanagari
    pub fn is_mixed_script(&self, text: &str) -> bool {
        has_latin(text) && text.chars().any(|c| DEVANAGARI.contains(c))
    }

    /// Detect the language of `text`, falling back to `default`
    pub fn detect(&self, text: &str, default: &Lang) -> Lang {
        if text.trim().is_empty() {
            return default.clone();
        }

        if self.is_mixed_script(text) {
            debug!("Detected mixed Latin/Devanagari text, treating as {}", DEVANAGARI.lang);
            return Lang::new(DEVANAGARI.lang);
        }

        if let Some(lang) = self.classifier.classify(text).winner() {
            debug!("Script-based detection: {}", lang);
            return Lang::new(lang);
        }

        if let Some(lang) = self.detect_statistical(text) {
            return lang;
        }

        if has_latin(text) {
            debug!("Detected Latin script, defaulting to {}", LATIN_LANG);
            return Lang::new(LATIN_LANG);
        }

        warn!("Could not detect language, using default: {}", default);
        default.clone()
    }

    /// Detect using the configured default language
    pub fn detect_default(&self, text: &str) -> Lang {
        self.detect(text, &self.default_lang)
    }

    /// Detection with mixed-script flag and confidence
    pub fn language_info(&self, text: &str) -> DetectionResult {
        let confidence = if self.classifier.classify(text).is_empty() {
            Confidence::Medium
        } else {
            Confidence::High
        };

        DetectionResult {
            detected_language: self.detect_default(text),
            is_mixed_script: self.is_mixed_script(text),
            confidence,
        }
    }

    fn detect_statistical(&self, text: &str) -> Option<Lang> {
        let detector = self.statistical.as_ref()?;

        match detector.detect_freeform(text) {
            Ok(Some(code)) if config::is_supported(&code) => {
                debug!("{} detection: {}", detector.name(), code);
                Some(Lang::new(code))
            }
            Ok(Some(code)) => {
                debug!("{} returned unsupported language {}, ignoring", detector.name(), code);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("{} failed: {}", detector.name(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    struct FixedDetector(Option<&'static str>);

    impl FreeformDetector for FixedDetector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn detect_freeform(&self, _text: &str) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenDetector;

    impl FreeformDetector for BrokenDetector {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn detect_freeform(&self, _text: &str) -> Result<Option<String>> {
            Err(Error::ConfigLoad("model file missing".to_string()))
        }
    }

    fn plain() -> LanguageIdentifier {
        LanguageIdentifier::with_detector(Lang::new("en"), None)
    }

    fn with(detector: impl FreeformDetector + 'static) -> LanguageIdentifier {
        LanguageIdentifier::with_detector(Lang::new("en"), Some(Box::new(detector)))
    }

    #[test]
    fn test_detect_scripts() {
        let id = plain();
        assert_eq!(id.detect_default("नमस्ते दुनिया").as_str(), "hi");
        assert_eq!(id.detect_default("হ্যালো বিশ্ব").as_str(), "bn");
        assert_eq!(id.detect_default("வணக்கம் உலகம்").as_str(), "ta");
        assert_eq!(id.detect_default("ہیلو دنیا").as_str(), "ur");
        assert_eq!(id.detect_default("ಹಲೋ ವರ್ಲ್ಡ್").as_str(), "kn");
    }

    #[test]
    fn test_detect_english() {
        assert_eq!(plain().detect_default("Hello world").as_str(), "en");
    }

    #[test]
    fn test_empty_and_whitespace_return_default() {
        let id = plain();
        let default = Lang::new("ta");
        assert_eq!(id.detect("", &default), default);
        assert_eq!(id.detect("   ", &default), default);
        assert_eq!(id.detect("\n\t", &default), default);
    }

    #[test]
    fn test_mixed_script_is_hindi() {
        let id = plain();
        let text = "Aaj main market जा रहा हूं";
        assert!(id.is_mixed_script(text));
        assert_eq!(id.detect_default(text).as_str(), "hi");
    }

    #[test]
    fn test_mixed_script_beats_script_majority() {
        // more Tamil than Devanagari, but Latin + Devanagari present
        let id = plain();
        let text = "ok வணக்கம் உலகம் न";
        assert_eq!(id.classifier.classify(text).winner(), Some("ta"));
        assert_eq!(id.detect_default(text).as_str(), "hi");
    }

    #[test]
    fn test_latin_with_other_script_is_not_mixed() {
        let id = plain();
        let text = "hello வணக்கம்";
        assert!(!id.is_mixed_script(text));
        assert_eq!(id.detect_default(text).as_str(), "ta");
    }

    #[test]
    fn test_punctuation_only_falls_through_to_default() {
        let id = with(FixedDetector(None));
        let default = Lang::new("bn");
        assert_eq!(id.detect("123 ... !!", &default), default);
    }

    #[test]
    fn test_statistical_result_used_before_latin_default() {
        let id = with(FixedDetector(Some("mr")));
        assert_eq!(id.detect_default("kasa aahes").as_str(), "mr");
    }

    #[test]
    fn test_statistical_unsupported_result_ignored() {
        let id = with(FixedDetector(Some("fr")));
        assert_eq!(id.detect_default("bonjour tout le monde").as_str(), "en");
    }

    #[test]
    fn test_statistical_failure_degrades() {
        let id = with(BrokenDetector);
        assert_eq!(id.detect_default("hello there").as_str(), "en");
        assert_eq!(id.detect("?!", &Lang::new("gu")).as_str(), "gu");
    }

    #[test]
    fn test_script_match_precedes_statistical() {
        let id = with(FixedDetector(Some("mr")));
        assert_eq!(id.detect_default("नमस्ते").as_str(), "hi");
    }

    #[test]
    fn test_language_info_confidence() {
        let id = plain();

        let info = id.language_info("नमस्ते");
        assert_eq!(info.detected_language.as_str(), "hi");
        assert_eq!(info.confidence, Confidence::High);
        assert!(!info.is_mixed_script);

        let info = id.language_info("Hello world");
        assert_eq!(info.detected_language.as_str(), "en");
        assert_eq!(info.confidence, Confidence::Medium);

        let info = id.language_info("main जा रहा");
        assert!(info.is_mixed_script);
        assert_eq!(info.confidence, Confidence::High);
    }

    #[test]
    fn test_detector_enabled_from_config() {
        let id = LanguageIdentifier::new(&DetectionConfig::default());
        assert!(id.statistical.is_some());

        let id = LanguageIdentifier::new(&DetectionConfig {
            statistical: false,
            ..Default::default()
        });
        assert!(id.statistical.is_none());
    }
}
