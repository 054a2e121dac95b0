//! Shared application state.

use explorer_core::{Result, ServerConfig, Settings};
use explorer_dip::DipClient;
use explorer_gemini::client::GEMINI_BASE_URL;
use explorer_gemini::GeminiClient;
use parking_lot::RwLock;
use tracing::info;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub settings: RwLock<Settings>,
    gemini_base_url: String,
}

impl AppState {
    /// Load the stored settings. An unreadable settings file is fatal.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let settings = Settings::load(&config.data_paths.settings_file)?;
        info!(
            "Loaded settings from {} (Gemini key: {}, DIP key: {})",
            config.data_paths.settings_file.display(),
            settings.gemini.api_key.is_some(),
            settings.bundestag.api_key.is_some(),
        );
        Ok(Self {
            config,
            settings: RwLock::new(settings),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point Gemini calls at another endpoint.
    pub fn with_gemini_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.gemini_base_url = base_url.into();
        self
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// A DIP client built from the current settings, so key changes apply
    /// to the next request.
    pub fn dip_client(&self) -> Result<DipClient> {
        DipClient::from_settings(&self.settings.read().bundestag)
    }

    /// A Gemini client from the current settings. Fails when no key is set.
    pub fn gemini_client(&self) -> Result<GeminiClient> {
        let settings = self.settings.read();
        GeminiClient::with_base_url(&self.gemini_base_url, &settings.gemini, &settings.ui.preferred_language)
    }
}
