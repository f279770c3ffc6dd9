//! Length guard: short answers are expanded by the generator before analysis.
//!
//! Never fails: every generator error degrades to returning the original text.

use std::time::Duration;

use tracing::{debug, info};

use crate::llm_client::{LlmError, TextGenerator};
use crate::profile::prompts::{build_expand_prompt, ExpansionTarget};

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when `text` should be sent for expansion: non-blank and under `min_words`.
pub fn needs_expansion(text: &str, min_words: usize) -> bool {
    !text.trim().is_empty() && word_count(text) < min_words
}

/// Folds a generator result into the text to analyze.
pub fn expansion_or_original(original: &str, result: Result<String, LlmError>) -> String {
    match result {
        Ok(expanded) if !expanded.trim().is_empty() => expanded.trim().to_string(),
        Ok(_) => original.to_string(),
        Err(e) => {
            debug!("answer expansion failed, keeping original text: {e}");
            original.to_string()
        }
    }
}

/// Returns `text` unchanged when it is blank or already long enough,
/// otherwise the generator's expansion of it (or `text` on any failure).
pub async fn expand_answer(
    text: &str,
    min_words: usize,
    generator: &dyn TextGenerator,
    timeout: Duration,
) -> String {
    if !needs_expansion(text, min_words) {
        return text.to_string();
    }

    info!(
        words = word_count(text),
        min_words, "answer below minimum length, requesting expansion"
    );
    let prompt = build_expand_prompt(text, ExpansionTarget::default());
    expansion_or_original(text, generator.invoke(&prompt, timeout).await)
}
