//! Configuration, data directory management and persisted settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_DIP_BASE_URL: &str = "https://search.dip.bundestag.de/api/v1";
pub const DEFAULT_DATASET: &str = "vorgang";
pub const DEFAULT_LANGUAGE: &str = "de";
pub const DEFAULT_TASK: &str = "summary";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Du bist ein hilfreicher Assistent, der Informationen \
aus Bundestagsunterlagen präzise zusammenfasst. Liefere strukturierte, verständliche Antworten \
auf Deutsch und weise auf fehlende Informationen hin.";

pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:4173",
    "http://127.0.0.1:4173",
];

/// Paths to the explorer's data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Configuration directory (`data/config/`).
    pub config_dir: PathBuf,
    /// Persisted settings (`data/config/app_config.json`).
    pub settings_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let config_dir = root.join("config");
        let paths = Self {
            settings_file: config_dir.join("app_config.json"),
            config_dir,
            root,
        };
        std::fs::create_dir_all(&paths.config_dir)?;
        Ok(paths)
    }
}

/// Process-level configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let cors_origins = std::env::var("EXPLORER_CORS_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir)?,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------
// Persisted settings
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundestagSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Opaque filter defaults keyed like query parameters (`f.titel`, ...).
    #[serde(default = "default_filters")]
    pub default_filters: Map<String, Value>,
    #[serde(default = "default_dataset")]
    pub default_dataset: String,
}

impl Default for BundestagSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_filters: default_filters(),
            default_dataset: default_dataset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default = "default_task")]
    pub default_gemini_task: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            preferred_language: default_language(),
            default_gemini_task: default_task(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_base_url() -> String {
    DEFAULT_DIP_BASE_URL.into()
}
fn default_dataset() -> String {
    DEFAULT_DATASET.into()
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.into()
}
fn default_task() -> String {
    DEFAULT_TASK.into()
}
fn default_filters() -> Map<String, Value> {
    let mut filters = Map::new();
    filters.insert("f.wahlperiode".into(), Value::Array(Vec::new()));
    filters.insert("f.vorgangstyp".into(), Value::Array(Vec::new()));
    filters.insert("f.titel".into(), Value::String(String::new()));
    filters
}

/// Which API keys were taken from the environment rather than the file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EnvKeys {
    gemini: bool,
    bundestag: bool,
}

/// Stored settings (persisted to `app_config.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub bundestag: BundestagSettings,
    #[serde(default)]
    pub ui: UiSettings,
    /// Path to settings file for saving.
    #[serde(skip)]
    pub settings_path: PathBuf,
    /// Env-sourced keys stay in memory only.
    #[serde(skip)]
    env_keys: EnvKeys,
}

impl Settings {
    /// Load settings from file, falling back to env vars and defaults.
    ///
    /// A missing or blank file yields the defaults; a file that exists but
    /// cannot be parsed is an error.
    pub fn load(settings_path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(settings_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut settings: Settings = if raw.trim().is_empty() {
            Settings::default()
        } else {
            serde_json::from_str(&raw).map_err(|e| {
                Error::Config(format!("Konfigurationsdatei konnte nicht gelesen werden: {}", e))
            })?
        };

        settings.settings_path = settings_path.to_path_buf();

        settings.apply_env_keys(non_empty_env("GEMINI_API_KEY"), non_empty_env("DIP_API_KEY"));

        Ok(settings)
    }

    /// Fill keys the file lacks from the environment.
    fn apply_env_keys(&mut self, gemini: Option<String>, bundestag: Option<String>) {
        if self.gemini.api_key.is_none() && gemini.is_some() {
            self.gemini.api_key = gemini;
            self.env_keys.gemini = true;
        }
        if self.bundestag.api_key.is_none() && bundestag.is_some() {
            self.bundestag.api_key = bundestag;
            self.env_keys.bundestag = true;
        }
    }

    /// The settings as written to disk: keys from the environment are left out.
    fn persisted(&self) -> Settings {
        let mut stored = self.clone();
        if self.env_keys.gemini {
            stored.gemini.api_key = None;
        }
        if self.env_keys.bundestag {
            stored.bundestag.api_key = None;
        }
        stored
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.persisted())?;
        std::fs::write(&self.settings_path, json)?;
        info!("Saved settings to {}", self.settings_path.display());
        Ok(())
    }

    /// Apply a partial update. Only supplied fields overwrite; an empty API
    /// key clears the stored one.
    ///
    /// Returns a validation error when the update carries no field at all.
    pub fn apply_update(&mut self, update: &SettingsUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(Error::Validation("Keine Änderungen übermittelt.".into()));
        }

        if let Some(g) = &update.gemini {
            if let Some(k) = &g.api_key {
                self.gemini.api_key = normalize_key(k);
                self.env_keys.gemini = false;
            }
            if let Some(m) = &g.model {
                self.gemini.model = m.clone();
            }
            if let Some(p) = &g.system_prompt {
                self.gemini.system_prompt = p.clone();
            }
            if let Some(t) = g.temperature {
                self.gemini.temperature = t;
            }
        }

        if let Some(b) = &update.bundestag {
            if let Some(k) = &b.api_key {
                self.bundestag.api_key = normalize_key(k);
                self.env_keys.bundestag = false;
            }
            if let Some(u) = &b.base_url {
                self.bundestag.base_url = u.clone();
            }
            if let Some(f) = &b.default_filters {
                self.bundestag.default_filters = f.clone();
            }
            if let Some(d) = &b.default_dataset {
                self.bundestag.default_dataset = d.clone();
            }
        }

        if let Some(u) = &update.ui {
            if let Some(l) = &u.preferred_language {
                self.ui.preferred_language = l.clone();
            }
            if let Some(t) = &u.default_gemini_task {
                self.ui.default_gemini_task = t.clone();
            }
        }

        Ok(())
    }

    /// Build the public view (no API keys exposed).
    pub fn to_view(&self) -> SettingsView {
        SettingsView {
            gemini: GeminiView {
                api_key: None,
                has_api_key: self.gemini.api_key.is_some(),
                api_key_preview: mask_key(self.gemini.api_key.as_deref()),
                model: self.gemini.model.clone(),
                system_prompt: self.gemini.system_prompt.clone(),
                temperature: self.gemini.temperature,
            },
            bundestag: BundestagView {
                api_key: None,
                has_api_key: self.bundestag.api_key.is_some(),
                api_key_preview: mask_key(self.bundestag.api_key.as_deref()),
                base_url: self.bundestag.base_url.clone(),
                default_filters: self.bundestag.default_filters.clone(),
                default_dataset: self.bundestag.default_dataset.clone(),
            },
            ui: self.ui.clone(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_key(key: &str) -> Option<String> {
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Mask an API key for display: short keys are fully starred, longer keys
/// keep their first three and last two characters.
pub fn mask_key(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return Some("*".repeat(chars.len()));
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    Some(format!("{}***{}", head, tail))
}

// ---------------------------------------------------------------
// Update / view shapes
// ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiUpdate {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundestagUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_filters: Option<Map<String, Value>>,
    pub default_dataset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiUpdate {
    pub preferred_language: Option<String>,
    pub default_gemini_task: Option<String>,
}

/// Settings update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub gemini: Option<GeminiUpdate>,
    pub bundestag: Option<BundestagUpdate>,
    pub ui: Option<UiUpdate>,
}

impl SettingsUpdate {
    /// True when no namespace carries a single supplied field.
    pub fn is_empty(&self) -> bool {
        let gemini_empty = self.gemini.as_ref().map_or(true, |g| {
            g.api_key.is_none() && g.model.is_none() && g.system_prompt.is_none() && g.temperature.is_none()
        });
        let bundestag_empty = self.bundestag.as_ref().map_or(true, |b| {
            b.api_key.is_none()
                && b.base_url.is_none()
                && b.default_filters.is_none()
                && b.default_dataset.is_none()
        });
        let ui_empty = self
            .ui
            .as_ref()
            .map_or(true, |u| u.preferred_language.is_none() && u.default_gemini_task.is_none());
        gemini_empty && bundestag_empty && ui_empty
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiView {
    pub api_key: Option<String>,
    pub has_api_key: bool,
    pub api_key_preview: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundestagView {
    pub api_key: Option<String>,
    pub has_api_key: bool,
    pub api_key_preview: Option<String>,
    pub base_url: String,
    pub default_filters: Map<String, Value>,
    pub default_dataset: String,
}

/// Settings as shown to the browser (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub gemini: GeminiView,
    pub bundestag: BundestagView,
    pub ui: UiSettings,
}
