//! String utility functions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utilities::exceptions::InterpolationError;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").expect("valid regex"));

/// Interpolate `{key}` placeholders while leaving JSON-looking text untouched.
///
/// Only `{identifier}` spans are treated as variables, so a literal
/// `{"a": 1}` survives. Every variable found must have a value in `inputs`.
pub fn interpolate_only(
    input: &str,
    inputs: &HashMap<String, String>,
) -> Result<String, InterpolationError> {
    if !input.contains('{') {
        return Ok(input.to_string());
    }

    let mut missing = None;
    let result = VARIABLE_PATTERN.replace_all(input, |caps: &regex::Captures<'_>| {
        match inputs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| caps[1].to_string());
                caps[0].to_string()
            }
        }
    });

    match missing {
        Some(name) => Err(InterpolationError::MissingVariable(name)),
        None => Ok(result.into_owned()),
    }
}

/// Truncate `text` to at most `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Lowercased alphanumeric terms of at least three characters.
pub fn search_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Number of distinct `query_terms` that occur in `candidate`.
pub fn overlap_score(query_terms: &[String], candidate: &str) -> usize {
    let haystack = candidate.to_lowercase();
    let mut seen: Vec<&String> = Vec::new();
    for term in query_terms {
        if !seen.contains(&term) && haystack.contains(term.as_str()) {
            seen.push(term);
        }
    }
    seen.len()
}
