//! Main Crew struct.
//!
//! A crew is a set of agents and an ordered list of tasks. Tasks run one
//! after another, each seeing the outputs of the tasks before it.

use std::collections::HashMap;
use std::sync::Arc;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agent::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::memory::ShortTermMemory;
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::CrewError;
use crate::utilities::logger::Logger;
use crate::utilities::printer::PrinterColor;
use crate::utilities::rpm_controller::RpmController;

/// Separator between earlier task outputs in a task's context.
pub const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// Represents a group of agents, defining how they should collaborate and the
/// tasks they should perform.
#[derive(Debug)]
pub struct Crew {
    /// Unique identifier for the crew instance.
    pub id: Uuid,
    /// Optional name for the crew.
    pub name: Option<String>,
    pub agents: Vec<Arc<Agent>>,
    /// Tasks in execution order.
    pub tasks: Vec<Task>,
    /// Indicates the verbosity level for logging during execution.
    pub verbose: bool,
    /// Short-term memory; when set, every task output is recorded and
    /// recalled for later tasks.
    pub memory: Option<ShortTermMemory>,
    /// Crew-wide request limit for agents without their own.
    pub max_rpm: Option<u32>,
    /// Usage metrics of the last kickoff.
    pub usage_metrics: Option<UsageMetrics>,
    rpm_controller: Option<Arc<RpmController>>,
}

impl Crew {
    pub fn new(agents: Vec<Arc<Agent>>, tasks: Vec<Task>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            agents,
            tasks,
            verbose: false,
            memory: None,
            max_rpm: None,
            usage_metrics: None,
            rpm_controller: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_memory(mut self, memory: ShortTermMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_max_rpm(mut self, max_rpm: u32) -> Self {
        self.max_rpm = Some(max_rpm);
        self.rpm_controller = Some(Arc::new(RpmController::new(Some(max_rpm))));
        self
    }

    /// Compute the key property (MD5 hash of agent keys + task keys).
    pub fn key(&self) -> String {
        let source = self
            .agents
            .iter()
            .map(|a| a.key())
            .chain(self.tasks.iter().map(Task::key))
            .collect::<Vec<_>>()
            .join("|");
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Reject crews that cannot run.
    pub fn validate(&self) -> Result<(), CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }
        for task in &self.tasks {
            if self.agent_index(&task.agent).is_none() {
                return Err(CrewError::UnknownAgent {
                    task: task.display_name().to_string(),
                    role: task.agent.role.clone(),
                });
            }
        }
        Ok(())
    }

    fn agent_index(&self, agent: &Agent) -> Option<usize> {
        self.agents.iter().position(|a| a.id == agent.id)
    }

    /// Execute the crew's workflow.
    ///
    /// `inputs` fill `{placeholders}` in agents and tasks. The crew's own
    /// descriptors are left untouched, so the crew can be kicked off again
    /// with other inputs.
    pub async fn kickoff(
        &mut self,
        inputs: Option<HashMap<String, String>>,
    ) -> Result<CrewOutput, CrewError> {
        self.validate()?;
        let inputs = inputs.unwrap_or_default();
        let agents = self.prepare_agents(&inputs)?;

        let logger = Logger::new(self.verbose);
        let crew_name = self.name.clone().unwrap_or_else(|| "crew".to_string());
        log::info!("Crew '{}' kickoff with {} task(s)", crew_name, self.tasks.len());
        logger.log(
            "info",
            &format!("Crew Execution Started: {} ({})", crew_name, self.id),
            Some(PrinterColor::BoldBlue),
        );

        let mut task_outputs: Vec<TaskOutput> = Vec::new();
        let mut usage = UsageMetrics::default();

        for index in 0..self.tasks.len() {
            let mut task = self.tasks[index].clone();
            let agent_index = self.agent_index(&task.agent).ok_or_else(|| CrewError::UnknownAgent {
                task: task.display_name().to_string(),
                role: task.agent.role.clone(),
            })?;
            task.agent = Arc::clone(&agents[agent_index]);
            task.interpolate_inputs(&inputs)?;

            let context = aggregate_raw_outputs(&task_outputs);
            let context = (!context.is_empty()).then_some(context);

            log::debug!("Executing task {}: {}", index + 1, task.display_name());
            let output = task
                .execute(context.as_deref(), self.memory.as_ref())
                .await
                .map_err(|source| CrewError::Task {
                    task: task.display_name().to_string(),
                    source,
                })?;

            if let Some(memory) = &self.memory {
                if let Err(e) = memory.save(
                    &output.raw,
                    Some(output.agent.as_str()),
                    Some(task.description.as_str()),
                ) {
                    log::warn!("Failed to add to short term memory: {}", e);
                }
            }

            usage.add_usage_metrics(&task.usage_metrics);
            let stored = &mut self.tasks[index];
            stored.output = Some(output.clone());
            stored.usage_metrics = task.usage_metrics;
            stored.start_time = task.start_time;
            stored.end_time = task.end_time;
            task_outputs.push(output);
        }

        self.usage_metrics = Some(usage);
        let crew_output = create_crew_output(task_outputs, usage)?;

        log::info!(
            "Crew '{}' finished, {} total tokens",
            crew_name,
            usage.total_tokens
        );
        logger.log(
            "info",
            &format!("Crew Execution Completed: {}", crew_name),
            Some(PrinterColor::BoldGreen),
        );
        Ok(crew_output)
    }

    /// Per-kickoff copies of the agents, interpolated and sharing the crew
    /// limiter.
    fn prepare_agents(
        &self,
        inputs: &HashMap<String, String>,
    ) -> Result<Vec<Arc<Agent>>, CrewError> {
        self.agents
            .iter()
            .map(|agent| -> Result<Arc<Agent>, CrewError> {
                let mut agent = Agent::clone(agent);
                agent.interpolate_inputs(inputs)?;
                if let Some(controller) = &self.rpm_controller {
                    agent.set_rpm_controller(Arc::clone(controller));
                }
                Ok(Arc::new(agent))
            })
            .collect()
    }

    /// Sum of token usage over the tasks of the last kickoff.
    pub fn calculate_usage_metrics(&self) -> UsageMetrics {
        let mut total = UsageMetrics::default();
        for task in &self.tasks {
            total.add_usage_metrics(&task.usage_metrics);
        }
        total
    }
}

/// Raw outputs joined with [`CONTEXT_SEPARATOR`].
pub fn aggregate_raw_outputs(outputs: &[TaskOutput]) -> String {
    outputs
        .iter()
        .map(|o| o.raw.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

fn create_crew_output(
    task_outputs: Vec<TaskOutput>,
    token_usage: UsageMetrics,
) -> Result<CrewOutput, CrewError> {
    let raw = task_outputs
        .iter()
        .rev()
        .find(|t| !t.raw.trim().is_empty())
        .map(|t| t.raw.clone())
        .ok_or(CrewError::NoOutput)?;
    Ok(CrewOutput::new(raw, task_outputs, token_usage))
}

impl std::fmt::Display for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Crew(id={}, number_of_agents={}, number_of_tasks={})",
            self.id,
            self.agents.len(),
            self.tasks.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLLM;
    use crate::utilities::exceptions::AgentError;

    fn agent(role: &str, llm: Arc<ScriptedLLM>) -> Arc<Agent> {
        Arc::new(Agent::new(role, format!("{} goal about {{topic}}", role), "b").with_llm(llm))
    }

    #[tokio::test]
    async fn test_sequential_context_and_output() {
        let llm = ScriptedLLM::new([
            "Final Answer: the plan",
            "Final Answer: the draft",
            "Final Answer: the article",
        ]);
        let planner = agent("Planner", llm.clone());
        let writer = agent("Writer", llm.clone());
        let tasks = vec![
            Task::new("Plan {topic}", "plan", planner.clone()).with_name("plan"),
            Task::new("Write {topic}", "draft", writer.clone()).with_name("write"),
            Task::new("Edit", "article", writer.clone()).with_name("edit"),
        ];
        let mut crew = Crew::new(vec![planner, writer], tasks);

        let inputs = HashMap::from([("topic".to_string(), "AI".to_string())]);
        let output = crew.kickoff(Some(inputs)).await.unwrap();

        assert_eq!(output.raw, "the article");
        assert_eq!(output.tasks_output.len(), 3);
        assert_eq!(output.token_usage.total_tokens, 30);
        assert_eq!(output.tasks_output[0].description, "Plan AI");

        let first_system = llm.requests.lock()[0].0[0].content.clone();
        assert!(first_system.contains("Planner goal about AI"));
        assert!(!llm.last_message_of(0).contains("context you're working with"));
        assert!(llm.last_message_of(2).contains("the plan\n\n----------\n\nthe draft"));

        // descriptors keep their placeholders
        assert_eq!(crew.tasks[0].description, "Plan {topic}");
        assert_eq!(crew.agents[0].goal, "Planner goal about {topic}");
        assert_eq!(crew.tasks[2].output.as_ref().map(|o| o.raw.as_str()), Some("the article"));
        assert_eq!(crew.calculate_usage_metrics().total_tokens, 30);
    }

    #[tokio::test]
    async fn test_empty_crew_rejected() {
        let mut crew = Crew::new(Vec::new(), Vec::new());
        assert!(matches!(crew.kickoff(None).await, Err(CrewError::NoTasks)));
    }

    #[tokio::test]
    async fn test_task_with_foreign_agent_rejected() {
        let llm = ScriptedLLM::new(Vec::<String>::new());
        let member = agent("Member", llm.clone());
        let outsider = agent("Outsider", llm);
        let mut crew = Crew::new(vec![member], vec![Task::new("t", "e", outsider)]);
        match crew.kickoff(None).await {
            Err(CrewError::UnknownAgent { role, .. }) => assert_eq!(role, "Outsider"),
            other => panic!("expected UnknownAgent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_input_variable() {
        let llm = ScriptedLLM::new(Vec::<String>::new());
        let a = agent("A", llm);
        let mut crew = Crew::new(vec![a.clone()], vec![Task::new("t", "e", a)]);
        let inputs = HashMap::from([("other".to_string(), "x".to_string())]);
        assert!(matches!(
            crew.kickoff(Some(inputs)).await,
            Err(CrewError::Interpolation(_))
        ));
    }

    #[tokio::test]
    async fn test_task_failure_names_task() {
        let no_llm = Arc::new(Agent::new("Idle", "g", "b"));
        let mut crew = Crew::new(
            vec![no_llm.clone()],
            vec![Task::new("t", "e", no_llm).with_name("first")],
        );
        match crew.kickoff(None).await {
            Err(CrewError::Task { task, source }) => {
                assert_eq!(task, "first");
                assert!(matches!(source, AgentError::NoLlm { .. }));
            }
            other => panic!("expected Task error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_memory_records_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("m.json")).unwrap();
        let llm = ScriptedLLM::new(["Final Answer: support answer", "Final Answer: review"]);
        let support = agent("Support", llm.clone());
        let qa = agent("QA", llm.clone());
        let tasks = vec![
            Task::new("Answer the support question", "answer", support.clone()),
            Task::new("Review the support answer", "review", qa.clone()),
        ];
        let mut crew = Crew::new(vec![support, qa], tasks).with_memory(memory);
        crew.kickoff(None).await.unwrap();

        let items = crew.memory.as_ref().map(|m| m.items()).unwrap_or_default();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].agent.as_deref(), Some("Support"));
        assert!(llm
            .last_message_of(1)
            .contains("Recent Insights:\n- support answer"));
    }

    #[tokio::test]
    async fn test_unwritable_memory_does_not_abort_kickoff() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("sub").join("m.json")).unwrap();
        // a plain file where the memory directory should go
        std::fs::write(dir.path().join("sub"), "").unwrap();

        let llm = ScriptedLLM::new(["Final Answer: support answer", "Final Answer: review"]);
        let support = agent("Support", llm.clone());
        let qa = agent("QA", llm.clone());
        let tasks = vec![
            Task::new("Answer the support question", "answer", support.clone()),
            Task::new("Review the support answer", "review", qa.clone()),
        ];
        let mut crew = Crew::new(vec![support, qa], tasks).with_memory(memory);

        let output = crew.kickoff(None).await.unwrap();
        assert_eq!(output.raw, "review");
        assert_eq!(output.tasks_output[0].raw, "support answer");
        assert_eq!(llm.requests.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_crew_rpm_shared_by_agents() {
        let llm = ScriptedLLM::new(["Final Answer: a"]);
        let a = agent("A", llm);
        let mut crew = Crew::new(vec![a.clone()], vec![Task::new("t", "e", a)]).with_max_rpm(5);
        let agents = crew.prepare_agents(&HashMap::new()).unwrap();
        assert_eq!(agents[0].rpm_controller().and_then(|c| c.max_rpm), Some(5));
        crew.kickoff(None).await.unwrap();
    }

    #[test]
    fn test_create_crew_output_uses_last_non_empty() {
        let outputs = vec![
            TaskOutput::new("a", "e", "r", "first"),
            TaskOutput::new("b", "e", "r", "  "),
        ];
        let out = create_crew_output(outputs, UsageMetrics::default()).unwrap();
        assert_eq!(out.raw, "first");
        assert!(matches!(
            create_crew_output(Vec::new(), UsageMetrics::default()),
            Err(CrewError::NoOutput)
        ));
    }
}
