//! Unicode-script based language guessing.

/// A codepoint range attributed to one language.
///
/// Two languages may share a range when they share a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub lang: &'static str,
    pub start: char,
    pub end: char,
}

impl ScriptRange {
    pub const fn contains(&self, c: char) -> bool {
        c >= self.start && c <= self.end
    }
}

/// Devanagari (Hindi, Marathi, Sanskrit). Also the primary script for
/// mixed-script detection.
pub const DEVANAGARI: ScriptRange = ScriptRange { lang: "hi", start: '\u{0900}', end: '\u{097F}' };

/// Classification table. Order matters: on equal counts the entry declared
/// first wins, so Bengali-script text always resolves to `bn`, never `as`.
pub const SCRIPT_RANGES: &[ScriptRange] = &[
    DEVANAGARI,
    ScriptRange { lang: "bn", start: '\u{0980}', end: '\u{09FF}' }, // Bengali
    ScriptRange { lang: "ta", start: '\u{0B80}', end: '\u{0BFF}' }, // Tamil
    ScriptRange { lang: "te", start: '\u{0C00}', end: '\u{0C7F}' }, // Telugu
    ScriptRange { lang: "gu", start: '\u{0A80}', end: '\u{0AFF}' }, // Gujarati
    ScriptRange { lang: "kn", start: '\u{0C80}', end: '\u{0CFF}' }, // Kannada
    ScriptRange { lang: "ml", start: '\u{0D00}', end: '\u{0D7F}' }, // Malayalam
    ScriptRange { lang: "pa", start: '\u{0A00}', end: '\u{0A7F}' }, // Gurmukhi
    ScriptRange { lang: "or", start: '\u{0B00}', end: '\u{0B7F}' }, // Odia
    ScriptRange { lang: "as", start: '\u{0980}', end: '\u{09FF}' }, // Bengali-Assamese
    ScriptRange { lang: "ur", start: '\u{0600}', end: '\u{06FF}' }, // Arabic
];

/// Per-language match counts, in table order. Zero counts are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    counts: Vec<(&'static str, usize)>,
}

impl ScriptCounts {
    pub fn get(&self, lang: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == lang)
            .map_or(0, |(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Language with the strictly highest count; first declared wins ties
    pub fn winner(&self) -> Option<&'static str> {
        let mut best: Option<(&'static str, usize)> = None;
        for &(lang, count) in &self.counts {
            if best.is_none_or(|(_, n)| count > n) {
                best = Some((lang, count));
            }
        }
        best.map(|(lang, _)| lang)
    }
}

/// Maps text to candidate languages by counting codepoints per script range
#[derive(Debug, Clone, Copy)]
pub struct ScriptClassifier {
    ranges: &'static [ScriptRange],
}

impl ScriptClassifier {
    pub const fn new() -> Self {
        Self { ranges: SCRIPT_RANGES }
    }

    pub fn classify(&self, text: &str) -> ScriptCounts {
        let counts = self
            .ranges
            .iter()
            .filter_map(|range| {
                let n = text.chars().filter(|&c| range.contains(c)).count();
                (n > 0).then_some((range.lang, n))
            })
            .collect();

        ScriptCounts { counts }
    }
}

impl Default for ScriptClassifier {
    fn default() -> Self {
        Self::new()
    }
}
