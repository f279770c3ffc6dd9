use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::command::DEFAULT_COMMAND;
use crate::llm_client::ollama::DEFAULT_OLLAMA_URL;
use crate::llm_client::DEFAULT_MODEL;
use crate::profile::pipeline::PipelineSettings;

/// Which external generator answers prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// Prompt on stdin of a CLI.
    Command,
    /// Ollama `/api/generate`.
    OllamaHttp,
}

impl FromStr for GeneratorBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(GeneratorBackend::Command),
            "ollama-http" | "http" => Ok(GeneratorBackend::OllamaHttp),
            other => {
                bail!("unknown generator backend '{other}' (expected 'command' or 'ollama-http')")
            }
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub output_dir: PathBuf,
    pub min_words: usize,
    pub generator_backend: GeneratorBackend,
    pub generator_command: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub expand_timeout_secs: u64,
    pub analyze_timeout_secs: u64,
    pub chart_font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            output_dir: PathBuf::from("profiles"),
            min_words: 50,
            generator_backend: GeneratorBackend::Command,
            generator_command: DEFAULT_COMMAND.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_MODEL.to_string(),
            expand_timeout_secs: 90,
            analyze_timeout_secs: 120,
            chart_font_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let generator_command = lookup("GENERATOR_COMMAND").unwrap_or(defaults.generator_command);
        if generator_command.trim().is_empty() {
            bail!("GENERATOR_COMMAND must not be empty");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            output_dir: lookup("PROFILER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            min_words: parse_or(&lookup, "PROFILER_MIN_WORDS", defaults.min_words)?,
            generator_backend: parse_or(&lookup, "GENERATOR_BACKEND", defaults.generator_backend)?,
            generator_command,
            ollama_url: lookup("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            expand_timeout_secs: parse_or(
                &lookup,
                "EXPAND_TIMEOUT_SECS",
                defaults.expand_timeout_secs,
            )?,
            analyze_timeout_secs: parse_or(
                &lookup,
                "ANALYZE_TIMEOUT_SECS",
                defaults.analyze_timeout_secs,
            )?,
            chart_font_path: lookup("CHART_FONT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            min_words: self.min_words,
            expand_timeout: Duration::from_secs(self.expand_timeout_secs),
            analyze_timeout: Duration::from_secs(self.analyze_timeout_secs),
            output_dir: self.output_dir.clone(),
            chart_font_path: self.chart_font_path.clone(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
    }
}
