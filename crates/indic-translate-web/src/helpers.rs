//! Helper types and traits for cleaner route handlers.
//!
//! Request validation and mapping of translation outcomes to HTTP status codes.

use axum::http::StatusCode;
use indic_translate_core::{FailureKind, TranslationResult};

/// Maximum characters accepted by `/translate`
pub const MAX_TEXT_CHARS: usize = 5000;
/// Maximum texts accepted by `/batch-translate`
pub const MAX_BATCH_TEXTS: usize = 50;

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Validate the length of a single text.
///
/// Returns 400 Bad Request unless the text has 1 to 5000 characters.
pub fn validate_text(text: &str) -> RouteResult<()> {
    let len = text.chars().count();
    if len == 0 || len > MAX_TEXT_CHARS {
        Err((
            StatusCode::BAD_REQUEST,
            format!("Text must be between 1 and {MAX_TEXT_CHARS} characters (got {len})"),
        ))
    } else {
        Ok(())
    }
}

/// Validate the number of texts in a batch.
pub fn validate_batch(count: usize) -> RouteResult<()> {
    if count > MAX_BATCH_TEXTS {
        Err((
            StatusCode::BAD_REQUEST,
            format!("Maximum {MAX_BATCH_TEXTS} texts per batch (got {count})"),
        ))
    } else {
        Ok(())
    }
}

/// HTTP status for a translation outcome.
pub const fn status_for(result: &TranslationResult) -> StatusCode {
    match result.error_kind {
        None => StatusCode::OK,
        Some(FailureKind::EmptyInput | FailureKind::UnsupportedPair) => StatusCode::BAD_REQUEST,
        Some(FailureKind::BackendLoad | FailureKind::BackendInference) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indic_translate_core::Lang;

    #[test]
    fn test_validate_text_bounds() {
        assert!(validate_text("").is_err());
        assert!(validate_text("a").is_ok());
        assert!(validate_text(&"न".repeat(MAX_TEXT_CHARS)).is_ok());

        let (status, _) = validate_text(&"a".repeat(MAX_TEXT_CHARS + 1)).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validate_batch_limit() {
        assert!(validate_batch(0).is_ok());
        assert!(validate_batch(MAX_BATCH_TEXTS).is_ok());
        assert!(validate_batch(MAX_BATCH_TEXTS + 1).is_err());
    }

    #[test]
    fn test_status_for_failure_kinds() {
        let mut result = TranslationResult {
            success: true,
            translated_text: Some("x".to_string()),
            source_lang: Some(Lang::new("hi")),
            target_lang: Lang::new("en"),
            method: None,
            error: None,
            error_kind: None,
        };
        assert_eq!(status_for(&result), StatusCode::OK);

        result.error_kind = Some(FailureKind::UnsupportedPair);
        assert_eq!(status_for(&result), StatusCode::BAD_REQUEST);

        result.error_kind = Some(FailureKind::BackendInference);
        assert_eq!(status_for(&result), StatusCode::BAD_GATEWAY);
    }
}
