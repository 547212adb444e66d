//! Crew output representation.
//!
//! The result of a crew run: the final answer, every task's output and the
//! tokens spent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;

/// Class that represents the result of a crew.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Raw output of the last task that produced one.
    pub raw: String,
    /// Output of each task, in execution order.
    pub tasks_output: Vec<TaskOutput>,
    /// Processed token summary.
    pub token_usage: UsageMetrics,
}

impl CrewOutput {
    pub fn new(raw: String, tasks_output: Vec<TaskOutput>, token_usage: UsageMetrics) -> Self {
        Self {
            raw,
            tasks_output,
            token_usage,
        }
    }

    /// Output of the task with the given name.
    pub fn task_output(&self, name: &str) -> Option<&TaskOutput> {
        self.tasks_output
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
