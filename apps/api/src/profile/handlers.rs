//! Axum route handlers for the Profile API.

use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::models::{score_list, TraitScore};
use crate::profile::pipeline::{profile_dir, run_profile};
use crate::profile::scenarios::random_scenario;
use crate::render::chart::CHART_FILE_NAME;
use crate::render::report::REPORT_FILE_NAME;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub scenario: String,
    pub min_words: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile_id: Uuid,
    pub type_code: String,
    pub summary: String,
    pub scores: Vec<TraitScore>,
    pub short_answer_warning: Option<String>,
    pub expanded: bool,
    pub raw_output: String,
    pub chart_url: String,
    pub report_url: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/scenario
pub async fn handle_get_scenario(State(state): State<AppState>) -> Json<ScenarioResponse> {
    Json(ScenarioResponse {
        scenario: random_scenario().to_string(),
        min_words: state.config.min_words,
    })
}

/// POST /api/v1/profiles
///
/// Expands a short answer if needed, requests the trait analysis, parses it
/// and renders the chart and report. Blank input goes through the same path;
/// an unusable analysis returns 422.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let settings = state.config.pipeline_settings();
    let outcome = run_profile(state.generator.as_ref(), &settings, &request.response).await?;

    info!(
        profile_id = %outcome.profile_id,
        backend = state.generator.backend_name(),
        "profile created"
    );

    let id = outcome.profile_id;
    Ok(Json(ProfileResponse {
        profile_id: id,
        type_code: outcome.record.type_code.clone(),
        summary: outcome.record.summary.clone(),
        scores: score_list(&outcome.record.scores),
        short_answer_warning: outcome.short_answer_warning,
        expanded: outcome.expanded,
        raw_output: outcome.raw_output,
        chart_url: format!("/api/v1/profiles/{id}/chart"),
        report_url: format!("/api/v1/profiles/{id}/report"),
    }))
}

/// GET /api/v1/profiles/:id/chart
pub async fn handle_get_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = read_artifact(artifact_path(&state, id, CHART_FILE_NAME)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// GET /api/v1/profiles/:id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = read_artifact(artifact_path(&state, id, REPORT_FILE_NAME)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    ))
}

fn artifact_path(state: &AppState, id: Uuid, file_name: &str) -> PathBuf {
    profile_dir(&state.config.output_dir, id).join(file_name)
}

async fn read_artifact(path: PathBuf) -> Result<Vec<u8>, AppError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} not found",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ))),
        Err(e) => Err(AppError::Internal(
            anyhow::Error::new(e).context(format!("reading {}", path.display())),
        )),
    }
}
