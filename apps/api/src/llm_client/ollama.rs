//! Ollama HTTP backend: `POST /api/generate` with streaming disabled.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{non_empty_output, LlmError, TextGenerator, DEFAULT_MODEL};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

#[derive(Clone)]
pub struct OllamaHttpGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaHttpGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl Default for OllamaHttpGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_MODEL)
    }
}

#[async_trait]
impl TextGenerator for OllamaHttpGenerator {
    async fn invoke(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        debug!(
            model = %self.model,
            chars = generated.response.len(),
            "ollama generate succeeded"
        );

        non_empty_output(&generated.response)
    }

    fn backend_name(&self) -> &'static str {
        "ollama-http"
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout {
            secs: timeout.as_secs(),
        }
    } else {
        LlmError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let generator = OllamaHttpGenerator::new("http://localhost:11434/", "deepseek-r1:7b");
        assert_eq!(generator.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_request_serializes_with_stream_disabled() {
        let body = GenerateRequest {
            model: "deepseek-r1:7b",
            prompt: "hi",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "deepseek-r1:7b");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_deserializes_ignoring_extra_fields() {
        let json = r#"{"model":"deepseek-r1:7b","response":"MBTI: INFP","done":true}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response, "MBTI: INFP");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // Port 9 (discard) is not served on a test host; the connect fails fast.
        let generator = OllamaHttpGenerator::new("http://127.0.0.1:9", "m");
        let result = generator.invoke("prompt", Duration::from_secs(2)).await;
        assert!(matches!(
            result,
            Err(LlmError::Http(_)) | Err(LlmError::Timeout { .. })
        ));
    }
}
