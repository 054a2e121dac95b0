//! Shared selection store: the currently selected document text and the
//! last generation result.
//!
//! Both cells are replaced wholesale; a reader never observes the title of
//! one write together with the text of another.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// The document text currently forwarded to the task workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub title: String,
    pub text: String,
    /// The source record, if the selection came from a search result.
    pub metadata: Option<serde_json::Value>,
}

impl Selection {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    #[serde(default)]
    pub candidates: Vec<String>,
}

/// Process-wide selection state, shared by reference between the search
/// results and the task workspace.
#[derive(Default)]
pub struct SelectionStore {
    selection: RwLock<Selection>,
    result: RwLock<Option<GenerationResult>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. All three fields change together.
    pub fn set_selected_content(
        &self,
        title: impl Into<String>,
        text: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) {
        let next = Selection {
            title: title.into(),
            text: text.into(),
            metadata,
        };
        *self.selection.write() = next;
    }

    pub fn clear_selected_content(&self) {
        *self.selection.write() = Selection::default();
    }

    /// Snapshot of the current selection.
    pub fn selection(&self) -> Selection {
        self.selection.read().clone()
    }

    pub fn set_generation_result(&self, result: GenerationResult) {
        *self.result.write() = Some(result);
    }

    pub fn reset_generation_result(&self) {
        *self.result.write() = None;
    }

    pub fn generation_result(&self) -> Option<GenerationResult> {
        self.result.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_replace_is_wholesale() {
        let store = SelectionStore::new();
        store.set_selected_content("A", "text a", Some(serde_json::json!({"id": 1})));
        store.set_selected_content("B", "text b", None);

        let sel = store.selection();
        assert_eq!(sel.title, "B");
        assert_eq!(sel.text, "text b");
        assert!(sel.metadata.is_none());
    }

    #[test]
    fn test_clear() {
        let store = SelectionStore::new();
        store.set_selected_content("A", "text", None);
        store.clear_selected_content();
        assert_eq!(store.selection(), Selection::default());
        assert!(!store.selection().has_text());
    }

    #[test]
    fn test_result_cell_is_independent() {
        let store = SelectionStore::new();
        store.set_selected_content("A", "text", None);
        store.set_generation_result(GenerationResult {
            text: "summary".into(),
            candidates: vec!["summary".into()],
        });
        store.reset_generation_result();
        assert!(store.generation_result().is_none());
        assert_eq!(store.selection().title, "A");
    }

    #[test]
    fn test_concurrent_readers_see_whole_triples() {
        let store = Arc::new(SelectionStore::new());
        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    store.set_selected_content(format!("t{}", i), format!("x{}", i), None);
                }
            })
        };
        for _ in 0..500 {
            let sel = store.selection();
            if !sel.title.is_empty() {
                assert_eq!(sel.title[1..], sel.text[1..]);
            }
        }
        writer.join().unwrap();
    }
}
