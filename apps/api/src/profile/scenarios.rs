//! Reflective writing scenarios offered to the respondent.

use rand::seq::IndexedRandom;

pub const SCENARIOS: [&str; 5] = [
    "A struggling scientist builds a tool that bypasses paywalls, opening access to research for all. Reflect on the ethics, and your stance.",
    "A teacher hacks a grading system to expose unfair evaluation standards. Discuss your perspective.",
    "An online community bans anonymity to prevent abuse. Do you agree or disagree?",
    "A child speaks against a school's unfair policy and goes viral. Is it bravery or immaturity?",
    "A company introduces brain-chip implants for cognitive enhancement. Would you opt in or stay away?",
];

/// Picks one scenario uniformly at random.
pub fn random_scenario() -> &'static str {
    SCENARIOS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(SCENARIOS[0])
}
