//! Static catalog mapping language pairs to translation model ids.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::{Lang, SUPPORTED_LANGUAGES};

/// Ordered (source, target) language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: Lang,
    pub target: Lang,
}

impl LanguagePair {
    pub fn new(source: impl Into<Lang>, target: impl Into<Lang>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A pair the router can translate directly, with the model serving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedPair {
    pub source: Lang,
    pub target: Lang,
    pub model: String,
}

/// Built-in opus-mt table. Languages without a dedicated model go through
/// the grouped `mul` models.
const OPUS_MT_PAIRS: &[(&str, &str, &str)] = &[
    // Indian languages to English
    ("hi", "en", "Helsinki-NLP/opus-mt-hi-en"),
    ("bn", "en", "Helsinki-NLP/opus-mt-bn-en"),
    ("ta", "en", "Helsinki-NLP/opus-mt-ta-en"),
    ("te", "en", "Helsinki-NLP/opus-mt-te-en"),
    ("mr", "en", "Helsinki-NLP/opus-mt-mr-en"),
    ("gu", "en", "Helsinki-NLP/opus-mt-gu-en"),
    ("ur", "en", "Helsinki-NLP/opus-mt-ur-en"),
    // English to Indian languages
    ("en", "hi", "Helsinki-NLP/opus-mt-en-hi"),
    ("en", "bn", "Helsinki-NLP/opus-mt-en-bn"),
    ("en", "ta", "Helsinki-NLP/opus-mt-en-ta"),
    ("en", "te", "Helsinki-NLP/opus-mt-en-te"),
    ("en", "mr", "Helsinki-NLP/opus-mt-en-mr"),
    ("en", "gu", "Helsinki-NLP/opus-mt-en-gu"),
    ("en", "ur", "Helsinki-NLP/opus-mt-en-ur"),
    // Many-to-one
    ("ml", "en", "Helsinki-NLP/opus-mt-mul-en"),
    ("kn", "en", "Helsinki-NLP/opus-mt-mul-en"),
    ("pa", "en", "Helsinki-NLP/opus-mt-mul-en"),
    ("or", "en", "Helsinki-NLP/opus-mt-mul-en"),
    ("as", "en", "Helsinki-NLP/opus-mt-mul-en"),
    ("sa", "en", "Helsinki-NLP/opus-mt-mul-en"),
    // One-to-many
    ("en", "ml", "Helsinki-NLP/opus-mt-en-mul"),
    ("en", "kn", "Helsinki-NLP/opus-mt-en-mul"),
    ("en", "pa", "Helsinki-NLP/opus-mt-en-mul"),
    ("en", "or", "Helsinki-NLP/opus-mt-en-mul"),
    ("en", "as", "Helsinki-NLP/opus-mt-en-mul"),
    ("en", "sa", "Helsinki-NLP/opus-mt-en-mul"),
];

/// Read-only mapping from language pair to model id.
///
/// Built once at startup and never mutated. Absence of a pair means
/// "no direct model".
#[derive(Debug, Clone)]
pub struct ModelMapping {
    pairs: Vec<SupportedPair>,
    index: HashMap<LanguagePair, usize>,
    multilingual: Option<String>,
}

impl ModelMapping {
    /// Build a mapping from (source, target, model id) triples.
    ///
    /// Later duplicates of a pair are ignored.
    pub fn from_pairs<I, S, T, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T, M)>,
        S: Into<Lang>,
        T: Into<Lang>,
        M: Into<String>,
    {
        let mut mapping = Self {
            pairs: Vec::new(),
            index: HashMap::new(),
            multilingual: None,
        };

        for (source, target, model) in pairs {
            let pair = LanguagePair::new(source, target);
            if mapping.index.contains_key(&pair) {
                continue;
            }
            mapping.index.insert(pair.clone(), mapping.pairs.len());
            mapping.pairs.push(SupportedPair {
                source: pair.source,
                target: pair.target,
                model: model.into(),
            });
        }

        mapping
    }

    /// Route every pair of supported languages through one multilingual model
    #[must_use]
    pub fn with_multilingual(mut self, model_id: impl Into<String>) -> Self {
        self.multilingual = Some(model_id.into());
        self
    }

    pub fn multilingual(&self) -> Option<&str> {
        self.multilingual.as_deref()
    }

    /// Model id for the pair, if one exists. Pure lookup.
    pub fn resolve(&self, source: &Lang, target: &Lang) -> Option<&str> {
        if let Some(ref model) = self.multilingual
            && source != target
            && source.nllb_code().is_some()
            && target.nllb_code().is_some()
        {
            return Some(model.as_str());
        }

        let pair = LanguagePair::new(source.clone(), target.clone());
        self.index
            .get(&pair)
            .map(|&i| self.pairs[i].model.as_str())
    }

    /// All directly translatable pairs in declaration order
    pub fn pairs(&self) -> Vec<SupportedPair> {
        let Some(ref model) = self.multilingual else {
            return self.pairs.clone();
        };

        SUPPORTED_LANGUAGES
            .iter()
            .flat_map(|s| {
                SUPPORTED_LANGUAGES
                    .iter()
                    .filter(move |t| t.code != s.code)
                    .map(move |t| SupportedPair {
                        source: Lang::new(s.code),
                        target: Lang::new(t.code),
                        model: model.clone(),
                    })
            })
            .collect()
    }

    /// Number of directly translatable pairs
    pub fn len(&self) -> usize {
        if self.multilingual.is_some() {
            let n = SUPPORTED_LANGUAGES.len();
            n * (n - 1)
        } else {
            self.pairs.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.multilingual.is_none()
    }
}

impl Default for ModelMapping {
    fn default() -> Self {
        Self::from_pairs(OPUS_MT_PAIRS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> Lang {
        Lang::new(code)
    }

    #[test]
    fn test_default_resolves_direct_pairs() {
        let mapping = ModelMapping::default();
        assert_eq!(
            mapping.resolve(&lang("hi"), &lang("en")),
            Some("Helsinki-NLP/opus-mt-hi-en")
        );
        assert_eq!(
            mapping.resolve(&lang("en"), &lang("kn")),
            Some("Helsinki-NLP/opus-mt-en-mul")
        );
    }

    #[test]
    fn test_default_has_no_indic_to_indic_pairs() {
        let mapping = ModelMapping::default();
        assert_eq!(mapping.resolve(&lang("hi"), &lang("ta")), None);
        assert_eq!(mapping.resolve(&lang("xx"), &lang("yy")), None);
    }

    #[test]
    fn test_pairs_keep_declaration_order() {
        let pairs = ModelMapping::default().pairs();
        assert_eq!(pairs.len(), OPUS_MT_PAIRS.len());
        assert_eq!(pairs[0].source.as_str(), "hi");
        assert_eq!(pairs[0].target.as_str(), "en");
        assert_eq!(pairs.last().map(|p| p.target.as_str()), Some("sa"));
    }

    #[test]
    fn test_from_pairs_ignores_duplicates() {
        let mapping = ModelMapping::from_pairs([("a", "b", "m1"), ("a", "b", "m2")]);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.resolve(&lang("a"), &lang("b")), Some("m1"));
    }

    #[test]
    fn test_multilingual_covers_supported_pairs_only() {
        let mapping = ModelMapping::default().with_multilingual("facebook/nllb-200-distilled-600M");
        assert_eq!(
            mapping.resolve(&lang("hi"), &lang("ta")),
            Some("facebook/nllb-200-distilled-600M")
        );
        assert_eq!(mapping.resolve(&lang("hi"), &lang("hi")), None);
        assert_eq!(mapping.resolve(&lang("xx"), &lang("en")), None);

        let n = SUPPORTED_LANGUAGES.len();
        assert_eq!(mapping.len(), n * (n - 1));
        assert_eq!(mapping.len(), mapping.pairs().len());
        assert!(!mapping.is_empty());
    }
}
