//! AI suggestion source.

mod client;
mod parse;
mod prompts;
mod suggester;

pub use client::*;
pub use parse::{extract_json, parse_suggestions, strip_code_fences};
pub use prompts::{format_suggestion_prompt, SUGGESTION_SYSTEM_PROMPT};
pub use suggester::*;
