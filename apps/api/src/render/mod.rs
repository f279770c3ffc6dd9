// Artifact rendering: radar chart PNG and PDF report.
// Both are CPU-bound and synchronous; async callers run them via spawn_blocking.

pub mod chart;
pub mod report;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::profile::models::PersonalityRecord;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

/// Paths of the two files produced for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileArtifacts {
    pub chart_path: PathBuf,
    pub report_path: PathBuf,
}

/// Chart first, then the report that embeds it.
pub fn render_artifacts(
    record: &PersonalityRecord,
    out_dir: &Path,
    font_path: Option<&Path>,
) -> Result<ProfileArtifacts, RenderError> {
    let chart_path = chart::render_chart(&record.scores, out_dir, font_path)?;
    let report_path = report::render_report(record, &chart_path, out_dir)?;
    Ok(ProfileArtifacts {
        chart_path,
        report_path,
    })
}
