//! Command backend: runs the model as a child process, prompt on stdin.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{non_empty_output, LlmError, TextGenerator};

/// Default command line, matching the local Ollama CLI.
pub const DEFAULT_COMMAND: &str = "ollama run deepseek-r1:7b";

/// Pipes a prompt into a CLI and returns its decoded stdout.
///
/// The child is killed if the timeout elapses; nothing from a timed-out run
/// is salvaged.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a whitespace-separated command line into program and arguments.
    /// Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn run(&self, prompt: &str) -> Result<String, LlmError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(LlmError::Spawn)?;

        // Feed stdin from a separate task so a chatty child can't deadlock us
        // on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            let input = prompt.as_bytes().to_vec();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    debug!("generator stdin write failed: {e}");
                }
                // stdin dropped here → EOF for the child
            });
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(LlmError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        non_empty_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for CommandGenerator {
    fn default() -> Self {
        Self::from_command_line(DEFAULT_COMMAND).unwrap_or_else(|| Self::new("ollama", vec![]))
    }
}

#[async_trait]
impl TextGenerator for CommandGenerator {
    async fn invoke(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        debug!(
            program = %self.program,
            prompt_chars = prompt.len(),
            timeout_secs = timeout.as_secs(),
            "invoking generator command"
        );
        match tokio::time::timeout(timeout, self.run(prompt)).await {
            Ok(result) => result,
            // Dropping the future drops the child, and kill_on_drop reaps it.
            Err(_) => Err(LlmError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line_splits_program_and_args() {
        let generator =
            CommandGenerator::from_command_line("  ollama run  deepseek-r1:7b ").unwrap();
        assert_eq!(generator.program(), "ollama");
        assert_eq!(generator.args(), ["run", "deepseek-r1:7b"]);
    }

    #[test]
    fn test_from_command_line_blank_is_none() {
        assert!(CommandGenerator::from_command_line("   ").is_none());
    }

    #[test]
    fn test_default_is_ollama_deepseek() {
        let generator = CommandGenerator::default();
        assert_eq!(generator.program(), "ollama");
        assert_eq!(generator.args(), ["run", "deepseek-r1:7b"]);
    }

    #[tokio::test]
    async fn test_invoke_returns_trimmed_stdout() {
        let generator = CommandGenerator::new("cat", vec![]);
        let out = generator
            .invoke("  Openness: 4/5\n", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "Openness: 4/5");
    }

    #[tokio::test]
    async fn test_invoke_empty_stdout_is_empty_content() {
        let generator = CommandGenerator::new("cat", vec![]);
        let result = generator.invoke("   ", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_invoke_non_zero_exit_is_process_failed() {
        let generator = CommandGenerator::new(
            "sh",
            vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        );
        let result = generator.invoke("prompt", Duration::from_secs(5)).await;
        match result {
            Err(LlmError::ProcessFailed { code, stderr }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected ProcessFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_times_out() {
        let generator = CommandGenerator::new("sleep", vec!["5".to_string()]);
        let result = generator.invoke("prompt", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(LlmError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_invoke_missing_binary_is_spawn_error() {
        let generator = CommandGenerator::new("definitely-not-a-real-binary-4711", vec![]);
        let result = generator.invoke("prompt", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(LlmError::Spawn(_))));
    }
}
