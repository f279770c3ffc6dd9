/// LLM Client: the single point of entry for every external text-generation call.
///
/// ARCHITECTURAL RULE: No other module may spawn the model process or talk to a
/// model server directly. All generation goes through a `TextGenerator`.
///
/// Two backends exist:
/// - `CommandGenerator`: pipes the prompt into a CLI (default `ollama run deepseek-r1:7b`).
/// - `OllamaHttpGenerator`: calls the Ollama `/api/generate` endpoint.
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod command;
pub mod ollama;

pub use command::CommandGenerator;
pub use ollama::OllamaHttpGenerator;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "deepseek-r1:7b";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to spawn generator process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("generator timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("generator exited with status {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generator returned empty content")]
    EmptyContent,
}

/// A blocking-with-timeout call into an external generative process.
///
/// Implementations return the decoded, trimmed output. Empty output is
/// `LlmError::EmptyContent` so callers never have to special-case it.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn invoke(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError>;

    /// Short backend label for logs ("command" | "ollama-http" | ...).
    fn backend_name(&self) -> &'static str;
}

/// Trims raw generator output, mapping blank output to `EmptyContent`.
pub(crate) fn non_empty_output(raw: &str) -> Result<String, LlmError> {
    let text = raw.trim();
    if text.is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(text.to_string())
    }
}
