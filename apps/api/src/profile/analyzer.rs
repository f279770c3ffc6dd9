//! Trait analysis request and the "is this a reply at all" gate.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::llm_client::{LlmError, TextGenerator};
use crate::profile::models::PersonalityTrait;
use crate::profile::prompts::build_analysis_prompt;

/// Prefix of every failed analysis result.
pub const ERROR_MARKER: &str = "Error";

/// Why a raw reply was refused before parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectionReason {
    #[error("analysis call failed: {0}")]
    CallFailed(String),

    #[error("reply does not mention '{0}'")]
    MissingAnchorTrait(&'static str),
}

/// Folds a generator result into the raw analysis text.
/// Failures become `"Error: <detail>"`.
pub fn analysis_text(result: Result<String, LlmError>) -> String {
    match result {
        Ok(text) => text.trim().to_string(),
        Err(e) => format!("{ERROR_MARKER}: {e}"),
    }
}

/// Sends `answer` for trait scoring and returns the reply verbatim
/// (or an `Error: ...` string).
pub async fn request_analysis(
    answer: &str,
    generator: &dyn TextGenerator,
    timeout: Duration,
) -> String {
    let prompt = build_analysis_prompt(answer, &PersonalityTrait::ALL);
    let result = generator.invoke(&prompt, timeout).await;
    if let Err(e) = &result {
        warn!(backend = generator.backend_name(), "analysis call failed: {e}");
    }
    analysis_text(result)
}

/// The single hard gate in front of the parser.
pub fn check_usable(raw: &str) -> Result<(), RejectionReason> {
    if let Some(detail) = raw.strip_prefix(ERROR_MARKER) {
        let detail = detail.trim_start_matches(':').trim();
        return Err(RejectionReason::CallFailed(detail.to_string()));
    }
    let anchor = PersonalityTrait::anchor().label();
    if !raw.contains(anchor) {
        return Err(RejectionReason::MissingAnchorTrait(anchor));
    }
    Ok(())
}
