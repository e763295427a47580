use thiserror::Error;

use crate::config::Lang;

/// Unified error type for indic-translate-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Translation routing (empty input, unresolvable language pairs)
/// - Backend operations (model construction, inference)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Routing Errors
    // ==========================================================================
    /// Nothing to translate; no work was attempted
    #[error("empty input text")]
    EmptyInput,

    /// No model resolves for the pair and pivoting did not produce one either
    #[error("no translation model available for {from} -> {to}")]
    UnsupportedPair { from: Lang, to: Lang },

    // ==========================================================================
    // Backend Errors
    // ==========================================================================
    /// Model construction failed (missing artifact, unreachable server, ...)
    #[error("failed to load model {model}: {reason}")]
    BackendLoad { model: String, reason: String },

    /// A loaded model failed to produce output
    #[error("inference failed on model {model}: {reason}")]
    BackendInference { model: String, reason: String },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means a model resolved but failed to run.
    pub const fn is_execution_failure(&self) -> bool {
        matches!(self, Self::BackendLoad { .. } | Self::BackendInference { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_pair_names_both_languages() {
        let err = Error::UnsupportedPair {
            from: Lang::new("ta"),
            to: Lang::new("ml"),
        };
        assert_eq!(err.to_string(), "no translation model available for ta -> ml");
        assert!(!err.is_execution_failure());
    }

    #[test]
    fn test_backend_errors_are_execution_failures() {
        let load = Error::BackendLoad {
            model: "m".to_string(),
            reason: "missing".to_string(),
        };
        let inference = Error::BackendInference {
            model: "m".to_string(),
            reason: "oom".to_string(),
        };
        assert!(load.is_execution_failure());
        assert!(inference.is_execution_failure());
        assert!(!Error::EmptyInput.is_execution_failure());
    }
}
