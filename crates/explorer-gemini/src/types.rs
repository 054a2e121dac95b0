//! Task request types matching the `/api/gemini` surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What Gemini should do with the text.
///
/// Unknown names decode to [`GeminiTask::Summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum GeminiTask {
    #[default]
    Summary,
    BulletPoints,
    KeyPoints,
    Translation,
    Custom,
}

impl GeminiTask {
    pub fn all() -> &'static [GeminiTask] {
        &[
            GeminiTask::Summary,
            GeminiTask::BulletPoints,
            GeminiTask::KeyPoints,
            GeminiTask::Translation,
            GeminiTask::Custom,
        ]
    }

    pub fn parse_lossy(name: &str) -> Self {
        match name.trim() {
            "bullet_points" => GeminiTask::BulletPoints,
            "key_points" => GeminiTask::KeyPoints,
            "translation" => GeminiTask::Translation,
            "custom" => GeminiTask::Custom,
            _ => GeminiTask::Summary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeminiTask::Summary => "summary",
            GeminiTask::BulletPoints => "bullet_points",
            GeminiTask::KeyPoints => "key_points",
            GeminiTask::Translation => "translation",
            GeminiTask::Custom => "custom",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            GeminiTask::Summary => "Zusammenfassen",
            GeminiTask::BulletPoints => "Stichpunkte",
            GeminiTask::KeyPoints => "Kernaussagen",
            GeminiTask::Translation => "Übersetzen",
            GeminiTask::Custom => "Eigene Anweisung",
        }
    }
}

impl From<String> for GeminiTask {
    fn from(name: String) -> Self {
        GeminiTask::parse_lossy(&name)
    }
}

impl fmt::Display for GeminiTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TONE_PRESETS: &[&str] = &["neutral", "formell", "informell", "analytisch", "prägnant"];
pub const LENGTH_PRESETS: &[&str] = &["sehr kurz", "kurz", "mittel", "ausführlich"];

/// Optional knobs for one task. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Non-empty value of an optional text option.
pub(crate) fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Incoming task request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub text: String,
    #[serde(default)]
    pub task: GeminiTask,
    #[serde(default)]
    pub options: TaskOptions,
}
