//! Core Task struct.
//!
//! A task is an instruction plus the criteria its answer must meet, bound
//! to the agent that will carry it out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agent::Agent;
use crate::memory::ShortTermMemory;
use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::{AgentError, InterpolationError};
use crate::utilities::string_utils::interpolate_only;

/// Represents a task to be executed by an agent.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: Uuid,
    /// Name of the task.
    pub name: Option<String>,
    /// Descriptive text detailing task's purpose and execution.
    pub description: String,
    /// Clear definition of expected task outcome.
    pub expected_output: String,
    /// Agent responsible for task execution.
    pub agent: Arc<Agent>,
    /// Task output, set after execution.
    pub output: Option<TaskOutput>,
    /// Tokens spent by the last execution.
    pub usage_metrics: UsageMetrics,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    original_description: Option<String>,
    original_expected_output: Option<String>,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            output: None,
            usage_metrics: UsageMetrics::default(),
            start_time: None,
            end_time: None,
            original_description: None,
            original_expected_output: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if set, else the description.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.description)
    }

    /// Generate the task prompt.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\nyou MUST return the actual complete content as the final answer, not a summary.",
            self.description, self.expected_output
        )
    }

    /// Compute the key property (MD5 hash of description|expected_output).
    pub fn key(&self) -> String {
        let desc = self
            .original_description
            .as_deref()
            .unwrap_or(&self.description);
        let expected = self
            .original_expected_output
            .as_deref()
            .unwrap_or(&self.expected_output);

        let source = format!("{}|{}", desc, expected);
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get the execution duration in seconds, if both start and end times are set.
    pub fn execution_duration(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }

    /// Interpolate inputs into the task description and expected output.
    pub fn interpolate_inputs(
        &mut self,
        inputs: &HashMap<String, String>,
    ) -> Result<(), InterpolationError> {
        let description = self
            .original_description
            .get_or_insert_with(|| self.description.clone());
        let expected = self
            .original_expected_output
            .get_or_insert_with(|| self.expected_output.clone());

        if inputs.is_empty() {
            return Ok(());
        }

        let description = interpolate_only(description, inputs)?;
        let expected = interpolate_only(expected, inputs)?;
        self.description = description;
        self.expected_output = expected;
        Ok(())
    }

    /// Run the bound agent on this task.
    ///
    /// `context` is the joined output of earlier tasks. When `memory` is
    /// given, insights relevant to the description are added to the prompt.
    pub async fn execute(
        &mut self,
        context: Option<&str>,
        memory: Option<&ShortTermMemory>,
    ) -> Result<TaskOutput, AgentError> {
        self.start_time = Some(Utc::now());

        let memory_context = match memory {
            Some(memory) => memory.contextual_block(&self.description).unwrap_or_else(|e| {
                log::warn!("Skipping memory recall: {}", e);
                String::new()
            }),
            None => String::new(),
        };

        let result = self
            .agent
            .execute_task(&self.prompt(), context, Some(memory_context.as_str()))
            .await?;

        let task_output = TaskOutput::new(
            self.description.clone(),
            self.expected_output.clone(),
            self.agent.role.clone(),
            result.output,
        )
        .with_name(self.name.clone());

        self.usage_metrics = result.usage;
        self.output = Some(task_output.clone());
        self.end_time = Some(Utc::now());
        Ok(task_output)
    }
}
