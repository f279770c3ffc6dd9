// Profile: turns a free-text reaction to an ethical scenario into trait
// scores, a type code and a summary.
//
//   scenarios   fixed dilemma texts shown to the user
//   expander    length guard; asks the generator to lengthen short answers
//   prompts     expansion and analysis prompt templates
//   analyzer    requests the analysis and checks the reply is usable
//   parser      turns the reply into a PersonalityRecord
//   pipeline    runs one submission through every stage
//   handlers    HTTP surface

pub mod analyzer;
pub mod expander;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod scenarios;
