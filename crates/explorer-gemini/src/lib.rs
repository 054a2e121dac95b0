//! Gemini task dispatch: turns a selected text plus task options into one
//! `generateContent` call and surfaces the text and alternate candidates.
//!
//! Calls go to Google's Generative Language API. No local model required.

pub mod client;
pub mod prompt;
pub mod types;
pub mod workspace;

pub use client::{GeminiClient, GenerationBackend};
pub use prompt::build_prompt;
pub use types::*;
pub use workspace::TaskWorkspace;
