//! Task workspace: task choice and options for the current selection.

use std::sync::Arc;

use explorer_core::{Error, GenerationResult, Result, SelectionStore, Settings};
use tracing::info;

use crate::client::GenerationBackend;
use crate::types::{GeminiRequest, GeminiTask, TaskOptions};

pub const EMPTY_TEXT_MESSAGE: &str = "Kein Text zur Verarbeitung übermittelt.";

pub const DEFAULT_TONE: &str = "analytisch";
pub const DEFAULT_LENGTH: &str = "kurz";

pub struct TaskWorkspace {
    backend: Arc<dyn GenerationBackend>,
    store: Arc<SelectionStore>,
    pub task: GeminiTask,
    pub language: String,
    pub tone: String,
    pub length: String,
    pub context: String,
    pub custom_instruction: String,
    pub temperature: f64,
}

impl TaskWorkspace {
    /// Task, language and temperature start from the stored settings.
    pub fn new(backend: Arc<dyn GenerationBackend>, store: Arc<SelectionStore>, settings: &Settings) -> Self {
        Self {
            backend,
            store,
            task: GeminiTask::parse_lossy(&settings.ui.default_gemini_task),
            language: settings.ui.preferred_language.clone(),
            tone: DEFAULT_TONE.into(),
            length: DEFAULT_LENGTH.into(),
            context: String::new(),
            custom_instruction: String::new(),
            temperature: settings.gemini.temperature,
        }
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn options(&self) -> TaskOptions {
        let opt = |s: &str| Some(s.to_string()).filter(|s| !s.trim().is_empty());
        TaskOptions {
            language: opt(&self.language),
            tone: opt(&self.tone),
            length: opt(&self.length),
            context: opt(&self.context),
            custom_instruction: opt(&self.custom_instruction),
            temperature: Some(self.temperature),
        }
    }

    /// True when there is something to send.
    pub fn can_run(&self) -> bool {
        self.store.selection().has_text()
    }

    /// Send the current selection once and store the result.
    ///
    /// A blank selection is refused without contacting the backend. A failed
    /// call leaves the previous result in place.
    pub async fn run(&self) -> Result<GenerationResult> {
        let selection = self.store.selection();
        if !selection.has_text() {
            return Err(Error::Validation(EMPTY_TEXT_MESSAGE.into()));
        }

        info!("Running Gemini task {} on {:?}", self.task, selection.title);
        let request = GeminiRequest {
            text: selection.text,
            task: self.task,
            options: self.options(),
        };
        let result = self.backend.generate(&request).await?;
        self.store.set_generation_result(result.clone());
        Ok(result)
    }

    /// Replace the selected text, keeping title and metadata.
    pub fn edit_text(&self, text: impl Into<String>) {
        let current = self.store.selection();
        self.store
            .set_selected_content(current.title, text, current.metadata);
    }

    /// Promote candidate `index` to the displayed result text.
    pub fn choose_candidate(&self, index: usize) -> Result<GenerationResult> {
        let mut result = self
            .store
            .generation_result()
            .ok_or_else(|| Error::NotFound("Kein Ergebnis vorhanden".into()))?;
        let candidate = result
            .candidates
            .get(index)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Variante {}", index + 1)))?;
        result.text = candidate;
        self.store.set_generation_result(result.clone());
        Ok(result)
    }

    /// Clear the result together with context and custom instruction.
    pub fn reset(&mut self) {
        self.store.reset_generation_result();
        self.context.clear();
        self.custom_instruction.clear();
    }
}
