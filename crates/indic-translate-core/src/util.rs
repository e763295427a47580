//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// True if the character is an ASCII Latin letter.
///
/// Only the basic Latin alphabet counts; accented Latin letters do not.
pub const fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// True if the text has at least one ASCII Latin letter.
pub fn has_latin(text: &str) -> bool {
    text.chars().any(is_latin_letter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_latin() {
        assert!(has_latin("main market जा रहा"));
        assert!(!has_latin("नमस्ते 123 !?"));
        assert!(!has_latin("é ü"));
    }
}
