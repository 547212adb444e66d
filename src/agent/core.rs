//! Core Agent struct.
//!
//! An agent is a role/goal/backstory persona with tuning limits, a tool
//! belt and the language model that runs it.

use std::collections::HashMap;
use std::sync::Arc;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agents::crew_agent_executor::{CrewAgentExecutor, ExecutorOutput};
use crate::llms::base_llm::BaseLLM;
use crate::tools::base_tool::BaseTool;
use crate::utilities::exceptions::{AgentError, InterpolationError};
use crate::utilities::printer::StepPrinter;
use crate::utilities::prompts::{task_with_context, task_with_memory, AgentInfo, Prompts};
use crate::utilities::rpm_controller::RpmController;
use crate::utilities::string_utils::interpolate_only;

/// Iteration cap used when none is configured.
pub const DEFAULT_MAX_ITER: u32 = 25;

/// Represents an agent in a crew.
///
/// Cloning is cheap: tools, model and RPM controller are shared, so clones
/// made for one kickoff count against the same request budget.
///
/// # Example
///
/// ```ignore
/// let agent = Agent::new("Editor", "Edit posts", "You edit.")
///     .with_llm(llm)
///     .with_max_iter(3);
/// ```
#[derive(Clone)]
pub struct Agent {
    /// Unique identifier for the agent.
    pub id: Uuid,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Recorded for parity with crew configurations; delegation is not
    /// offered as a tool.
    pub allow_delegation: bool,
    /// Verbose mode for the Agent Execution.
    pub verbose: bool,
    pub tools: Vec<Arc<dyn BaseTool>>,
    /// Maximum model turns before a final answer is forced.
    pub max_iter: u32,
    /// Maximum number of requests per minute.
    pub max_rpm: Option<u32>,
    /// Sampling temperature sent with every call this agent makes.
    pub temperature: Option<f64>,
    pub llm: Option<Arc<dyn BaseLLM>>,

    rpm_controller: Option<Arc<RpmController>>,
    original_role: Option<String>,
    original_goal: Option<String>,
    original_backstory: Option<String>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("allow_delegation", &self.allow_delegation)
            .field("verbose", &self.verbose)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("max_iter", &self.max_iter)
            .field("max_rpm", &self.max_rpm)
            .field("temperature", &self.temperature)
            .field("llm", &self.llm.as_ref().map(|l| l.model().to_string()))
            .finish()
    }
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
            tools: Vec::new(),
            max_iter: DEFAULT_MAX_ITER,
            max_rpm: None,
            temperature: None,
            llm: None,
            rpm_controller: None,
            original_role: None,
            original_goal: None,
            original_backstory: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn BaseTool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Limit this agent's model calls per minute.
    pub fn with_max_rpm(mut self, max_rpm: u32) -> Self {
        self.max_rpm = Some(max_rpm);
        self.rpm_controller = Some(Arc::new(RpmController::new(Some(max_rpm))));
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_allow_delegation(mut self, allow_delegation: bool) -> Self {
        self.allow_delegation = allow_delegation;
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn BaseLLM>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Share a crew-wide limiter. An agent with its own limit keeps it.
    pub fn set_rpm_controller(&mut self, controller: Arc<RpmController>) {
        if self.rpm_controller.is_none() {
            self.rpm_controller = Some(controller);
        }
    }

    pub fn rpm_controller(&self) -> Option<&Arc<RpmController>> {
        self.rpm_controller.as_ref()
    }

    /// MD5 over the uninterpolated role, goal and backstory.
    pub fn key(&self) -> String {
        let role = self.original_role.as_deref().unwrap_or(&self.role);
        let goal = self.original_goal.as_deref().unwrap_or(&self.goal);
        let backstory = self
            .original_backstory
            .as_deref()
            .unwrap_or(&self.backstory);

        let source = format!("{}|{}|{}", role, goal, backstory);
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Fill `{placeholders}` in role, goal and backstory.
    ///
    /// Interpolation always starts from the original text, so calling this
    /// again with other inputs re-targets the agent.
    pub fn interpolate_inputs(
        &mut self,
        inputs: &HashMap<String, String>,
    ) -> Result<(), InterpolationError> {
        let role = self.original_role.get_or_insert_with(|| self.role.clone());
        let goal = self.original_goal.get_or_insert_with(|| self.goal.clone());
        let backstory = self
            .original_backstory
            .get_or_insert_with(|| self.backstory.clone());

        if inputs.is_empty() {
            return Ok(());
        }

        let role = interpolate_only(role, inputs)?;
        let goal = interpolate_only(goal, inputs)?;
        let backstory = interpolate_only(backstory, inputs)?;
        self.role = role;
        self.goal = goal;
        self.backstory = backstory;
        Ok(())
    }

    /// Run one task to a final answer.
    ///
    /// `context` holds the outputs of earlier tasks and `memory_context` the
    /// recalled memory block; either may be empty.
    pub async fn execute_task(
        &self,
        task_prompt: &str,
        context: Option<&str>,
        memory_context: Option<&str>,
    ) -> Result<ExecutorOutput, AgentError> {
        let llm = self.llm.clone().ok_or_else(|| AgentError::NoLlm {
            role: self.role.clone(),
        })?;

        let mut input = task_with_context(task_prompt, context.unwrap_or_default());
        input = task_with_memory(&input, memory_context.unwrap_or_default());

        let prompts = Prompts::new(&self.tools).task_execution(
            &AgentInfo {
                role: &self.role,
                goal: &self.goal,
                backstory: &self.backstory,
            },
            &input,
        );

        let printer = StepPrinter::new(self.verbose);
        printer.task_started(&self.role, task_prompt);
        log::info!("Agent '{}' started task", self.role);

        let unlimited = RpmController::default();
        let rpm = self.rpm_controller.as_deref().unwrap_or(&unlimited);

        let output = CrewAgentExecutor::new(llm, &self.role, &self.tools, rpm, self.max_iter)
            .with_temperature(self.temperature)
            .with_printer(printer)
            .invoke(&prompts.system, &prompts.user)
            .await?;

        log::info!(
            "Agent '{}' finished task in {} iteration(s)",
            self.role,
            output.iterations
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLLM;

    fn inputs(topic: &str) -> HashMap<String, String> {
        HashMap::from([("topic".to_string(), topic.to_string())])
    }

    #[test]
    fn test_defaults() {
        let agent = Agent::new("r", "g", "b");
        assert_eq!(agent.max_iter, DEFAULT_MAX_ITER);
        assert!(!agent.allow_delegation);
        assert!(agent.llm.is_none());
        assert!(agent.rpm_controller().is_none());
    }

    #[test]
    fn test_interpolation_is_repeatable() {
        let mut agent = Agent::new("Planner", "Plan {topic}", "About {topic}.");
        let key = agent.key();

        agent.interpolate_inputs(&inputs("AI")).unwrap();
        assert_eq!(agent.goal, "Plan AI");
        agent.interpolate_inputs(&inputs("Rust")).unwrap();
        assert_eq!(agent.goal, "Plan Rust");
        assert_eq!(agent.backstory, "About Rust.");
        assert_eq!(agent.key(), key);
    }

    #[test]
    fn test_interpolation_missing_variable() {
        let mut agent = Agent::new("r", "Plan {topic}", "b");
        let err = agent.interpolate_inputs(&HashMap::from([(
            "other".to_string(),
            "x".to_string(),
        )]));
        assert_eq!(err, Err(InterpolationError::MissingVariable("topic".into())));
    }

    #[test]
    fn test_key_is_md5_of_descriptor() {
        let agent = Agent::new("a", "b", "c");
        let mut hasher = Md5::new();
        hasher.update(b"a|b|c");
        assert_eq!(agent.key(), format!("{:x}", hasher.finalize()));
    }

    #[test]
    fn test_crew_controller_does_not_replace_own_limit() {
        let mut own = Agent::new("r", "g", "b").with_max_rpm(10);
        own.set_rpm_controller(Arc::new(RpmController::new(Some(99))));
        assert_eq!(own.rpm_controller().and_then(|c| c.max_rpm), Some(10));

        let mut shared = Agent::new("r", "g", "b");
        shared.set_rpm_controller(Arc::new(RpmController::new(Some(99))));
        assert_eq!(shared.rpm_controller().and_then(|c| c.max_rpm), Some(99));
    }

    #[tokio::test]
    async fn test_execute_task_without_llm() {
        let agent = Agent::new("Editor", "g", "b");
        let err = agent.execute_task("t", None, None).await.unwrap_err();
        assert!(matches!(err, AgentError::NoLlm { role } if role == "Editor"));
    }

    #[tokio::test]
    async fn test_execute_task_builds_prompts() {
        let llm = ScriptedLLM::new(["Thought: done\nFinal Answer: edited"]);
        let agent = Agent::new("Editor", "Edit posts", "You edit.")
            .with_llm(llm.clone())
            .with_temperature(0.3);

        let out = agent
            .execute_task("Proofread.", Some("draft text"), Some("Recent Insights:\n- tone"))
            .await
            .unwrap();
        assert_eq!(out.output, "edited");

        let requests = llm.requests.lock();
        let (messages, options) = &requests[0];
        assert!(messages[0].content.starts_with("You are Editor. You edit."));
        assert!(messages[1].content.contains("Current Task: Proofread."));
        assert!(messages[1].content.contains("This is the context you're working with:\ndraft text"));
        assert!(messages[1].content.contains("# Useful context: \nRecent Insights:\n- tone"));
        assert_eq!(options.temperature, Some(0.3));
    }
}
