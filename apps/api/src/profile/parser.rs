//! Response Parser: turns the model's semi-structured reply into a `PersonalityRecord`.
//!
//! Each line is classified on its own and malformed lines are dropped, never
//! fatal. The caller must run `analyzer::check_usable` first; this module
//! assumes the reply looks like an analysis at all.
//!
//! # Line rules
//! - Score line: contains `:` and a canonical trait name. The label before the
//!   first `:` must equal the trait name after trimming; the value, minus a
//!   trailing `/5`, must parse as a number within `[0, 5]`.
//! - Type-code line: first line whose trimmed, lowercased text starts with `mbti`.
//! - Summary: everything after the type-code line, trimmed.

use tracing::debug;

use crate::profile::models::{
    PersonalityRecord, PersonalityTrait, TraitScores, MAX_SCORE, MIN_SCORE, UNKNOWN_TYPE_CODE,
};

/// Leading token of the type-code line, compared case-insensitively.
pub const TYPE_CODE_LABEL: &str = "mbti";

const SCORE_SUFFIX: &str = "/5";

/// How a single reply line contributes to the score mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Recognized(PersonalityTrait, f64),
    Unrecognized,
}

/// Classifies one line as a score line or not.
pub fn classify_score_line(line: &str) -> LineOutcome {
    if !line.contains(':') || !mentions_any_trait(line) {
        return LineOutcome::Unrecognized;
    }
    let Some((label, value)) = line.split_once(':') else {
        return LineOutcome::Unrecognized;
    };
    let Some(trait_name) = PersonalityTrait::from_label(label.trim()) else {
        return LineOutcome::Unrecognized;
    };
    match parse_score_value(value) {
        Some(score) => LineOutcome::Recognized(trait_name, score),
        None => LineOutcome::Unrecognized,
    }
}

fn mentions_any_trait(line: &str) -> bool {
    PersonalityTrait::ALL.iter().any(|t| line.contains(t.label()))
}

/// `" 4/5 "` → `Some(4.0)`. Out-of-range, non-finite or non-numeric → `None`.
fn parse_score_value(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix(SCORE_SUFFIX).unwrap_or(value).trim();
    let score: f64 = number.parse().ok()?;
    (MIN_SCORE..=MAX_SCORE).contains(&score).then_some(score)
}

/// Folds per-line outcomes into the score mapping. Later lines win.
pub fn collect_scores<I>(outcomes: I) -> TraitScores
where
    I: IntoIterator<Item = LineOutcome>,
{
    let mut scores = TraitScores::new();
    for outcome in outcomes {
        if let LineOutcome::Recognized(trait_name, score) = outcome {
            scores.insert(trait_name, score);
        }
    }
    scores
}

fn is_type_code_line(line: &str) -> bool {
    line.trim().to_lowercase().starts_with(TYPE_CODE_LABEL)
}

/// Index of the type-code line, if any.
fn find_type_code_line(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| is_type_code_line(line))
}

/// Trimmed value after the first `:` on the type-code line, possibly empty.
/// A line with no `:` yields the sentinel.
fn extract_type_code(line: &str) -> String {
    match line.split_once(':') {
        Some((_, code)) => code.trim().to_string(),
        None => UNKNOWN_TYPE_CODE.to_string(),
    }
}

pub fn parse_response(raw: &str) -> PersonalityRecord {
    let lines: Vec<&str> = raw.lines().collect();

    let outcomes: Vec<LineOutcome> = lines.iter().map(|l| classify_score_line(l)).collect();
    let dropped = lines
        .iter()
        .zip(&outcomes)
        .filter(|(line, outcome)| {
            **outcome == LineOutcome::Unrecognized && line.contains(':') && mentions_any_trait(line)
        })
        .count();
    if dropped > 0 {
        debug!(dropped, "skipped malformed trait score lines");
    }
    let scores = collect_scores(outcomes);

    let (type_code, summary_start) = match find_type_code_line(&lines) {
        Some(idx) => (extract_type_code(lines[idx]), idx + 1),
        None => (UNKNOWN_TYPE_CODE.to_string(), lines.len()),
    };

    let summary = lines[summary_start..].join("\n").trim().to_string();

    PersonalityRecord {
        scores,
        type_code,
        summary,
    }
}
