//! Prompt construction for the task types.

use crate::types::{given, GeminiTask, TaskOptions};

fn task_instruction(task: GeminiTask, language: &str) -> String {
    match task {
        GeminiTask::BulletPoints => format!(
            "Fasse die wichtigsten Inhalte in prägnanten Stichpunkten in {} zusammen.",
            language
        ),
        GeminiTask::KeyPoints => format!(
            "Liste die zentralen Kernaussagen, Entscheidungen und offenen Fragen in {} auf.",
            language
        ),
        GeminiTask::Translation => format!("Übersetze den folgenden Inhalt präzise in {}.", language),
        GeminiTask::Summary | GeminiTask::Custom => format!(
            "Erstelle eine kurze, gut strukturierte Zusammenfassung in {}.",
            language
        ),
    }
}

/// Build the user prompt. `default_language` applies when the options name
/// none. A custom task without an instruction behaves like a summary.
pub fn build_prompt(task: GeminiTask, text: &str, options: &TaskOptions, default_language: &str) -> String {
    let language = given(&options.language).unwrap_or(default_language);

    let mut instruction = match (task, given(&options.custom_instruction)) {
        (GeminiTask::Custom, Some(custom)) => custom.to_string(),
        _ => task_instruction(task, language),
    };

    if let Some(context) = given(&options.context) {
        instruction.push_str(&format!("\nBerücksichtige zusätzlich: {}", context));
    }
    if let Some(length) = given(&options.length) {
        instruction.push_str(&format!("\nZiel-Länge: {}.", length));
    }
    if let Some(tone) = given(&options.tone) {
        instruction.push_str(&format!("\nTonfall: {}.", tone));
    }

    format!("{}\n\nText:\n{}", instruction, text).trim().to_string()
}
