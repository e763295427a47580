//! Statistical (trigram) language detection.

use whatlang::{Detector, Lang};

use crate::error::Result;

/// Best-effort free-text language detector.
///
/// Implementations may be non-deterministic. An `Err` or `Ok(None)` both
/// mean "no opinion"; callers never propagate detector failures.
pub trait FreeformDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Language code for the text, if the detector has one
    fn detect_freeform(&self, text: &str) -> Result<Option<String>>;
}

/// Languages whatlang knows that the router supports
const ALLOWLIST: &[Lang] = &[
    Lang::Eng,
    Lang::Hin,
    Lang::Ben,
    Lang::Tam,
    Lang::Tel,
    Lang::Mar,
    Lang::Guj,
    Lang::Kan,
    Lang::Mal,
    Lang::Pan,
    Lang::Urd,
    Lang::Ori,
];

fn code_for(lang: Lang) -> Option<&'static str> {
    match lang {
        Lang::Eng => Some("en"),
        Lang::Hin => Some("hi"),
        Lang::Ben => Some("bn"),
        Lang::Tam => Some("ta"),
        Lang::Tel => Some("te"),
        Lang::Mar => Some("mr"),
        Lang::Guj => Some("gu"),
        Lang::Kan => Some("kn"),
        Lang::Mal => Some("ml"),
        Lang::Pan => Some("pa"),
        Lang::Urd => Some("ur"),
        Lang::Ori => Some("or"),
        _ => None,
    }
}

/// Whatlang-based detector restricted to supported languages
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::with_allowlist(ALLOWLIST.to_vec()),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeformDetector for WhatlangDetector {
    fn name(&self) -> &'static str {
        "whatlang"
    }

    fn detect_freeform(&self, text: &str) -> Result<Option<String>> {
        Ok(self
            .detector
            .detect_lang(text)
            .and_then(code_for)
            .map(str::to_string))
    }
}
