//! Task output representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Description of the task.
    pub description: String,
    /// Name of the task.
    pub name: Option<String>,
    /// Expected output of the task.
    pub expected_output: String,
    /// First ten words of the description followed by "...".
    pub summary: String,
    /// Raw output of the task.
    pub raw: String,
    /// Role of the agent that executed the task.
    pub agent: String,
}

impl TaskOutput {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            summary: Self::generate_summary(&description),
            description,
            name: None,
            expected_output: expected_output.into(),
            raw: raw.into(),
            agent: agent.into(),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// First 10 words of the description plus "...".
    pub fn generate_summary(description: &str) -> String {
        let excerpt = description
            .split_whitespace()
            .take(10)
            .collect::<Vec<&str>>()
            .join(" ");
        format!("{}...", excerpt)
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_takes_first_ten_words() {
        let out = TaskOutput::new(
            "1. Prioritize the latest trends, key players, and noteworthy news on AI.",
            "plan",
            "Content Planner",
            "the plan",
        );
        assert_eq!(
            out.summary,
            "1. Prioritize the latest trends, key players, and noteworthy news..."
        );
        assert_eq!(out.to_string(), "the plan");
    }

    #[test]
    fn test_short_description_summary() {
        assert_eq!(TaskOutput::generate_summary("Edit it"), "Edit it...");
    }
}
