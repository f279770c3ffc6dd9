// All prompt text for the profile pipeline.
// Templates carry `{placeholders}`; the builders below are the only place they get filled.

use crate::profile::models::PersonalityTrait;

/// Expansion prompt template.
/// Replace: {min_words}, {max_words}, {answer}
pub const EXPAND_PROMPT_TEMPLATE: &str = "Expand this short response into a thoughtful, detailed answer \
(~{min_words}-{max_words} words) while keeping the original meaning:\n\n'{answer}'";

/// Analysis prompt template.
/// Replace: {trait_list}, {format_lines}, {answer}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
You are a personality psychologist AI. Analyze the following reflective answer
and rate it from 1 to 5 in these traits:

{trait_list}

Then guess their MBTI type (e.g., INFP, ESTJ) and write a 4–5 sentence summary.

Format:
{format_lines}
MBTI: XXXX
Summary: [Your summary]

User Response:
{answer}
"#;

/// Target length for an expanded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionTarget {
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for ExpansionTarget {
    fn default() -> Self {
        Self {
            min_words: 100,
            max_words: 120,
        }
    }
}

pub fn build_expand_prompt(answer: &str, target: ExpansionTarget) -> String {
    EXPAND_PROMPT_TEMPLATE
        .replace("{min_words}", &target.min_words.to_string())
        .replace("{max_words}", &target.max_words.to_string())
        .replace("{answer}", answer)
}

/// Builds the analysis prompt over `traits`, in the order given.
pub fn build_analysis_prompt(answer: &str, traits: &[PersonalityTrait]) -> String {
    let trait_list = traits
        .iter()
        .map(|t| format!("- {}", t.label()))
        .collect::<Vec<_>>()
        .join("\n");
    let format_lines = traits
        .iter()
        .map(|t| format!("{}: X/5", t.label()))
        .collect::<Vec<_>>()
        .join("\n");

    // {answer} last: user text must not be able to inject another placeholder.
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{trait_list}", &trait_list)
        .replace("{format_lines}", &format_lines)
        .replace("{answer}", answer)
}
