//! Personality record types shared by the parser, renderers and handlers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Displayed and stored when the reply carried no usable type-code line.
pub const UNKNOWN_TYPE_CODE: &str = "???";

/// Inclusive score range accepted from the model.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 5.0;

/// The ten canonical traits, in prompt order.
///
/// Ordering of the enum is the display order everywhere (chart spokes,
/// report lines, API arrays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PersonalityTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
    #[serde(rename = "Honesty-Humility")]
    HonestyHumility,
    #[serde(rename = "Emotional Stability")]
    EmotionalStability,
    Creativity,
    Assertiveness,
    Empathy,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 10] = [
        PersonalityTrait::Openness,
        PersonalityTrait::Conscientiousness,
        PersonalityTrait::Extraversion,
        PersonalityTrait::Agreeableness,
        PersonalityTrait::Neuroticism,
        PersonalityTrait::HonestyHumility,
        PersonalityTrait::EmotionalStability,
        PersonalityTrait::Creativity,
        PersonalityTrait::Assertiveness,
        PersonalityTrait::Empathy,
    ];

    /// The exact label the model is asked to emit.
    pub const fn label(self) -> &'static str {
        match self {
            PersonalityTrait::Openness => "Openness",
            PersonalityTrait::Conscientiousness => "Conscientiousness",
            PersonalityTrait::Extraversion => "Extraversion",
            PersonalityTrait::Agreeableness => "Agreeableness",
            PersonalityTrait::Neuroticism => "Neuroticism",
            PersonalityTrait::HonestyHumility => "Honesty-Humility",
            PersonalityTrait::EmotionalStability => "Emotional Stability",
            PersonalityTrait::Creativity => "Creativity",
            PersonalityTrait::Assertiveness => "Assertiveness",
            PersonalityTrait::Empathy => "Empathy",
        }
    }

    /// Exact, case-sensitive match against the canonical labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// The trait whose label must appear for a reply to be considered at all.
    pub const fn anchor() -> Self {
        PersonalityTrait::Openness
    }
}

impl fmt::Display for PersonalityTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait → score, each value within `[MIN_SCORE, MAX_SCORE]`.
pub type TraitScores = BTreeMap<PersonalityTrait, f64>;

/// The parsed outcome of one analysis. Built once from the raw reply and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalityRecord {
    pub scores: TraitScores,
    pub type_code: String,
    pub summary: String,
}

impl PersonalityRecord {
    pub fn has_type_code(&self) -> bool {
        !self.type_code.is_empty() && self.type_code != UNKNOWN_TYPE_CODE
    }
}

/// One `{trait, score}` pair as exposed over the API, in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitScore {
    #[serde(rename = "trait")]
    pub trait_name: PersonalityTrait,
    pub score: f64,
}

pub fn score_list(scores: &TraitScores) -> Vec<TraitScore> {
    scores
        .iter()
        .map(|(&trait_name, &score)| TraitScore { trait_name, score })
        .collect()
}

/// Formats a score the way the report prints it: whole numbers keep one
/// decimal (`4.0`), anything else prints as-is (`3.75`).
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for t in PersonalityTrait::ALL {
            assert_eq!(PersonalityTrait::from_label(t.label()), Some(t));
        }
    }

    #[test]
    fn test_from_label_is_exact() {
        assert_eq!(PersonalityTrait::from_label("openness"), None);
        assert_eq!(PersonalityTrait::from_label(" Openness"), None);
        assert_eq!(PersonalityTrait::from_label("- Openness"), None);
        assert_eq!(
            PersonalityTrait::from_label("Emotional Stability"),
            Some(PersonalityTrait::EmotionalStability)
        );
    }

    #[test]
    fn test_enum_order_matches_all() {
        let mut sorted = PersonalityTrait::ALL;
        sorted.sort();
        assert_eq!(sorted, PersonalityTrait::ALL);
    }

    #[test]
    fn test_trait_serializes_as_label() {
        let json = serde_json::to_string(&PersonalityTrait::HonestyHumility).unwrap();
        assert_eq!(json, r#""Honesty-Humility""#);
    }

    #[test]
    fn test_scores_serialize_as_label_keyed_object() {
        let mut scores = TraitScores::new();
        scores.insert(PersonalityTrait::EmotionalStability, 3.0);
        let json = serde_json::to_value(&scores).unwrap();
        assert_eq!(json["Emotional Stability"], 3.0);
    }

    #[test]
    fn test_score_list_is_canonical_order() {
        let mut scores = TraitScores::new();
        scores.insert(PersonalityTrait::Empathy, 2.0);
        scores.insert(PersonalityTrait::Openness, 4.0);
        let list = score_list(&scores);
        assert_eq!(list[0].trait_name, PersonalityTrait::Openness);
        assert_eq!(list[1].trait_name, PersonalityTrait::Empathy);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(4.0), "4.0");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(3.5), "3.5");
        assert_eq!(format_score(3.75), "3.75");
    }

    #[test]
    fn test_has_type_code() {
        let record = PersonalityRecord {
            scores: TraitScores::new(),
            type_code: UNKNOWN_TYPE_CODE.to_string(),
            summary: String::new(),
        };
        assert!(!record.has_type_code());
        let empty = PersonalityRecord {
            type_code: String::new(),
            ..record
        };
        assert!(!empty.has_type_code());
    }
}
