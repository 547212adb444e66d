//! Parsing of ReAct-style model replies.
//!
//! A reply either asks for a tool (`Action` / `Action Input`) or ends the
//! task (`Final Answer:`). Anything else is an [`OutputParserError`] whose
//! message is sent back to the model as a correction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The text prefix for a final answer.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const MISSING_ACTION_AFTER_THOUGHT_ERROR_MESSAGE: &str =
    "I just got this: I couldn't find an Action after the Thought.";

const MISSING_ACTION_INPUT_AFTER_ACTION_ERROR_MESSAGE: &str =
    "I just got this: I found an Action but couldn't find a valid Action Input right after it.";

static ACTION_WITH_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:\s*(.+?)\s*(?:\n|\r\n?)Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)")
        .expect("valid regex")
});
static ACTION_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Action\s*\d*\s*:").expect("valid regex"));
static ACTION_INPUT_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("valid regex"));

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    pub thought: String,
    pub tool: String,
    pub tool_input: String,
    /// The raw reply that was parsed.
    pub text: String,
}

/// The model's final answer for the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub thought: String,
    pub output: String,
    pub text: String,
}

/// Result of parsing agent output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    Action(AgentAction),
    Finish(AgentFinish),
}

/// The reply did not follow the ReAct format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{error}")]
pub struct OutputParserError {
    /// Correction message for the model.
    pub error: String,
}

impl OutputParserError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Parse agent output text into an [`AgentAction`] or [`AgentFinish`].
///
/// ```text
/// Thought: I need the docs
/// Action: Read website content
/// Action Input: {}
/// ```
///
/// ```text
/// Thought: I now know the final answer
/// Final Answer: Call kickoff() on the crew.
/// ```
///
/// When both are present the final answer wins.
pub fn parse(text: &str) -> Result<ParseResult, OutputParserError> {
    let thought = extract_thought(text);

    if let Some(idx) = text.rfind(FINAL_ANSWER_ACTION) {
        let answer = text[idx + FINAL_ANSWER_ACTION.len()..].trim();
        return Ok(ParseResult::Finish(AgentFinish {
            thought,
            output: clean_trailing_backticks(answer),
            text: text.to_string(),
        }));
    }

    if let Some(caps) = ACTION_WITH_INPUT.captures(text) {
        let tool = clean_action(caps.get(1).map_or("", |m| m.as_str()));
        let tool_input = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_matches('"')
            .replace("\"\"\"", "\"");
        return Ok(ParseResult::Action(AgentAction {
            thought,
            tool,
            tool_input,
            text: text.to_string(),
        }));
    }

    if !ACTION_ONLY.is_match(text) {
        return Err(OutputParserError::new(format!(
            "{}\nYou MUST use the following format:\n\
             Thought: [your thought]\n\
             Final Answer: [your final answer]",
            MISSING_ACTION_AFTER_THOUGHT_ERROR_MESSAGE
        )));
    }

    if !ACTION_INPUT_ONLY.is_match(text) {
        return Err(OutputParserError::new(
            MISSING_ACTION_INPUT_AFTER_ACTION_ERROR_MESSAGE,
        ));
    }

    Err(OutputParserError::new(
        "Could not parse the output. Please use the correct format.",
    ))
}

/// Text before the first `Action` or `Final Answer` line, without a
/// leading `Thought:` label.
fn extract_thought(text: &str) -> String {
    let end = text
        .find("\nAction")
        .or_else(|| text.find("\nFinal Answer"))
        .unwrap_or(0);
    let thought = text[..end].replace("```", "");
    let thought = thought.trim();
    thought
        .strip_prefix("Thought:")
        .unwrap_or(thought)
        .trim()
        .to_string()
}

fn clean_action(text: &str) -> String {
    text.trim().trim_matches('*').trim().to_string()
}

/// Drop an unmatched trailing code fence from a final answer.
fn clean_trailing_backticks(text: &str) -> String {
    if text.ends_with("```") && text.matches("```").count() % 2 != 0 {
        return text[..text.len() - 3].trim_end().to_string();
    }
    text.to_string()
}
