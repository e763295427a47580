use anyhow::{Context, Result};
use indic_translate_core::{AppConfig, TranslationRouter, build_router};

/// Global application state
pub struct AppState {
    /// Shared router; serializes access to the model cache internally
    pub router: TranslationRouter,
    /// Effective configuration after CLI overrides
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let router = build_router(&config).context("Failed to create translation router")?;
        Ok(Self::with_router(router, config))
    }

    pub const fn with_router(router: TranslationRouter, config: AppConfig) -> Self {
        Self { router, config }
    }
}
