mod config;
mod errors;
mod layout;
mod llm_client;
mod profile;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, GeneratorBackend};
use crate::llm_client::{CommandGenerator, OllamaHttpGenerator, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Profiler API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;
    info!("Profiles written under {}", config.output_dir.display());

    let generator = build_generator(&config)?;
    info!("Text generator initialized (backend: {})", generator.backend_name());

    // Build app state
    let state = AppState {
        config: config.clone(),
        generator,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the configured text generator.
fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    Ok(match config.generator_backend {
        GeneratorBackend::Command => {
            let generator = CommandGenerator::from_command_line(&config.generator_command)
                .context("GENERATOR_COMMAND must name a program")?;
            info!(
                "Generator command: {} {}",
                generator.program(),
                generator.args().join(" ")
            );
            Arc::new(generator)
        }
        GeneratorBackend::OllamaHttp => {
            info!("Ollama endpoint: {} (model: {})", config.ollama_url, config.ollama_model);
            Arc::new(OllamaHttpGenerator::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            ))
        }
    })
}
