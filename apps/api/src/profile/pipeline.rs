//! Profile Pipeline: runs one submission end to end.
//!
//! Flow: Idle → Expanding → Requesting → Validating → Parsing → Rendering → Done,
//! or Validating → Rejected. Stages run strictly one after another; nothing is
//! retried. A rejected submission writes no files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::profile::analyzer::{check_usable, request_analysis};
use crate::profile::expander::{expand_answer, word_count};
use crate::profile::models::PersonalityRecord;
use crate::profile::parser::parse_response;
use crate::render::{render_artifacts, ProfileArtifacts};

/// User-facing message for a rejected analysis.
pub const REJECTION_MESSAGE: &str =
    "AI failed to analyze your response. Try providing more detail.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Expanding,
    Requesting,
    Validating,
    Parsing,
    Rendering,
    Done,
    Rejected,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Knobs for one pipeline run, taken from `Config`.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub min_words: usize,
    pub expand_timeout: Duration,
    pub analyze_timeout: Duration,
    pub output_dir: PathBuf,
    pub chart_font_path: Option<PathBuf>,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    pub profile_id: Uuid,
    pub record: PersonalityRecord,
    pub artifacts: ProfileArtifacts,
    pub short_answer_warning: Option<String>,
    pub expanded: bool,
    pub raw_output: String,
}

pub fn short_answer_warning(response: &str, min_words: usize) -> Option<String> {
    (word_count(response) < min_words).then(|| {
        format!(
            "Your response is shorter than {min_words} words. Auto-expanding it for analysis..."
        )
    })
}

/// Run directory for a profile: `<output_dir>/<profile_id>`.
pub fn profile_dir(output_dir: &Path, profile_id: Uuid) -> PathBuf {
    output_dir.join(profile_id.to_string())
}

fn enter(stage: PipelineStage, profile_id: Uuid) {
    info!(%profile_id, %stage, "profile pipeline stage");
}

pub async fn run_profile(
    generator: &dyn TextGenerator,
    settings: &PipelineSettings,
    response: &str,
) -> Result<ProfileOutcome, AppError> {
    let profile_id = Uuid::new_v4();
    enter(PipelineStage::Idle, profile_id);

    let short_answer_warning = short_answer_warning(response, settings.min_words);

    enter(PipelineStage::Expanding, profile_id);
    let answer = expand_answer(
        response,
        settings.min_words,
        generator,
        settings.expand_timeout,
    )
    .await;
    let expanded = answer != response;

    enter(PipelineStage::Requesting, profile_id);
    let raw_output = request_analysis(&answer, generator, settings.analyze_timeout).await;

    enter(PipelineStage::Validating, profile_id);
    if let Err(reason) = check_usable(&raw_output) {
        enter(PipelineStage::Rejected, profile_id);
        warn!(%profile_id, "analysis rejected: {reason}");
        return Err(AppError::Rejected(REJECTION_MESSAGE.to_string()));
    }

    enter(PipelineStage::Parsing, profile_id);
    let record = parse_response(&raw_output);
    info!(
        %profile_id,
        traits = record.scores.len(),
        type_code = %record.type_code,
        "analysis parsed"
    );
    if !record.has_type_code() {
        warn!(%profile_id, "analysis carried no usable type code");
    }

    enter(PipelineStage::Rendering, profile_id);
    let out_dir = profile_dir(&settings.output_dir, profile_id);
    let font_path = settings.chart_font_path.clone();
    let record_for_render = record.clone();
    // CPU-bound, so spawn_blocking to keep the async executor free.
    let artifacts = tokio::task::spawn_blocking(move || {
        render_artifacts(&record_for_render, &out_dir, font_path.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in rendering: {e}")))?
    .map_err(|e| AppError::Render(e.to_string()))?;

    enter(PipelineStage::Done, profile_id);
    Ok(ProfileOutcome {
        profile_id,
        record,
        artifacts,
        short_answer_warning,
        expanded,
        raw_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmError;
    use crate::profile::models::{PersonalityTrait, UNKNOWN_TYPE_CODE};

    fn settings(dir: &Path) -> PipelineSettings {
        PipelineSettings {
            min_words: 5,
            expand_timeout: Duration::from_secs(90),
            analyze_timeout: Duration::from_secs(120),
            output_dir: dir.to_path_buf(),
            chart_font_path: None,
        }
    }

    const LONG_ANSWER: &str = "I think open research access matters more than paywalls do.";

    #[tokio::test]
    async fn test_successful_run_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::replying(
            "Openness: 4/5\nConscientiousness: 3/5\nMBTI: INFP\nSummary line one.\nSummary line two.",
        );

        let outcome = run_profile(&generator, &settings(dir.path()), LONG_ANSWER)
            .await
            .unwrap();

        assert_eq!(outcome.record.type_code, "INFP");
        assert_eq!(outcome.record.scores[&PersonalityTrait::Openness], 4.0);
        assert!(!outcome.expanded);
        assert!(outcome.short_answer_warning.is_none());
        assert!(outcome.artifacts.chart_path.exists());
        assert!(outcome.artifacts.report_path.exists());
        assert_eq!(
            outcome.artifacts.report_path.parent().unwrap(),
            profile_dir(dir.path(), outcome.profile_id)
        );
        // Long answer: analysis only, no expansion call.
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_short_answer_is_expanded_then_analyzed() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![
            Ok("A much more detailed reflection on why I agree.".to_string()),
            Ok("Openness: 5/5\nMBTI: ENFP\nCurious.".to_string()),
        ]);

        let outcome = run_profile(&generator, &settings(dir.path()), "I agree.")
            .await
            .unwrap();

        assert!(outcome.expanded);
        assert!(outcome.short_answer_warning.is_some());
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].1, Duration::from_secs(90));
        assert_eq!(prompts[1].1, Duration::from_secs(120));
        assert!(prompts[1].0.contains("A much more detailed reflection"));
    }

    #[tokio::test]
    async fn test_failed_expansion_still_analyzes_original() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![
            Err(LlmError::Timeout { secs: 90 }),
            Ok("Openness: 2/5".to_string()),
        ]);

        let outcome = run_profile(&generator, &settings(dir.path()), "I agree.")
            .await
            .unwrap();

        assert!(!outcome.expanded);
        assert!(generator.prompts()[1].0.contains("User Response:\nI agree."));
        assert_eq!(outcome.record.type_code, UNKNOWN_TYPE_CODE);
        assert_eq!(outcome.record.summary, "");
    }

    #[tokio::test]
    async fn test_error_reply_is_rejected_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::new(vec![Err(LlmError::Timeout { secs: 120 })]);

        let result = run_profile(&generator, &settings(dir.path()), LONG_ANSWER).await;

        assert!(matches!(result, Err(AppError::Rejected(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reply_without_anchor_trait_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::replying("I cannot help with that.");

        let result = run_profile(&generator, &settings(dir.path()), LONG_ANSWER).await;

        match result {
            Err(AppError::Rejected(message)) => assert_eq!(message, REJECTION_MESSAGE),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_short_answer_warning_threshold() {
        assert!(short_answer_warning("one two", 3).is_some());
        assert!(short_answer_warning("one two three", 3).is_none());
        let message = short_answer_warning("", 50).unwrap();
        assert!(message.contains("50 words"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Rejected.to_string(), "Rejected");
    }
}
