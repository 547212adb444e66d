//! Agent executor: the ReAct loop.
//!
//! Drives one agent through one task. Each turn asks the model for the next
//! step, runs the requested tool and feeds the observation back, until the
//! model gives a `Final Answer:` or the iteration cap forces one.

use std::fmt;
use std::sync::Arc;

use super::parser::{parse, AgentAction, ParseResult};
use crate::llms::base_llm::{BaseLLM, CallOptions, LLMMessage};
use crate::tools::base_tool::BaseTool;
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::AgentError;
use crate::utilities::printer::StepPrinter;
use crate::utilities::prompts::{tool_error, unknown_tool, FORCE_FINAL_ANSWER};
use crate::utilities::rpm_controller::RpmController;

/// Stop sequence that keeps the model from inventing tool output.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Final answer and bookkeeping from one executor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOutput {
    pub output: String,
    pub iterations: u32,
    pub usage: UsageMetrics,
    /// Whether the answer had to be forced after the iteration cap.
    pub forced: bool,
}

/// Executor for crew agents.
pub struct CrewAgentExecutor<'a> {
    llm: Arc<dyn BaseLLM>,
    tools: &'a [Arc<dyn BaseTool>],
    rpm: &'a RpmController,
    printer: StepPrinter,
    role: &'a str,
    /// Maximum iterations before forcing a final answer.
    pub max_iter: u32,
    pub temperature: Option<f64>,
    /// Stop word list for the LLM.
    pub stop: Vec<String>,
    /// Conversation message history.
    pub messages: Vec<LLMMessage>,
    /// Current iteration count.
    pub iterations: u32,
    usage: UsageMetrics,
}

impl fmt::Debug for CrewAgentExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewAgentExecutor")
            .field("role", &self.role)
            .field("model", &self.llm.model())
            .field("max_iter", &self.max_iter)
            .field("iterations", &self.iterations)
            .field("messages_count", &self.messages.len())
            .field("tools_count", &self.tools.len())
            .finish()
    }
}

impl<'a> CrewAgentExecutor<'a> {
    pub fn new(
        llm: Arc<dyn BaseLLM>,
        role: &'a str,
        tools: &'a [Arc<dyn BaseTool>],
        rpm: &'a RpmController,
        max_iter: u32,
    ) -> Self {
        Self {
            llm,
            tools,
            rpm,
            printer: StepPrinter::default(),
            role,
            max_iter,
            temperature: None,
            stop: vec![OBSERVATION_STOP.to_string()],
            messages: Vec::new(),
            iterations: 0,
            usage: UsageMetrics::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_printer(mut self, printer: StepPrinter) -> Self {
        self.printer = printer;
        self
    }

    /// Run the loop from a system and user prompt until a final answer.
    pub async fn invoke(mut self, system: &str, user: &str) -> Result<ExecutorOutput, AgentError> {
        self.messages.clear();
        self.messages.push(LLMMessage::system(system));
        self.messages.push(LLMMessage::user(user));

        loop {
            if self.iterations >= self.max_iter {
                return self.force_final_answer().await;
            }

            let reply = self.call_llm().await?;
            match parse(&reply) {
                Ok(ParseResult::Finish(finish)) => {
                    return Ok(self.finish(finish.output, false));
                }
                Ok(ParseResult::Action(action)) => {
                    let observation = self.execute_tool(&action).await;
                    self.printer.tool_used(
                        self.role,
                        &action.thought,
                        &action.tool,
                        &action.tool_input,
                        &observation,
                    );
                    self.messages.push(LLMMessage::assistant(reply));
                    self.messages
                        .push(LLMMessage::user(format!("Observation: {}", observation)));
                }
                Err(e) => {
                    log::debug!("Agent '{}' reply did not parse: {}", self.role, e);
                    self.messages.push(LLMMessage::assistant(reply));
                    self.messages.push(LLMMessage::user(e.error));
                }
            }
        }
    }

    /// One model turn: wait for an RPM slot, call, count the iteration.
    async fn call_llm(&mut self) -> Result<String, AgentError> {
        self.rpm.check_or_wait().await;
        let options = CallOptions {
            stop: self.stop.clone(),
            temperature: self.temperature,
        };
        let response = self.llm.call(&self.messages, &options).await?;
        self.iterations += 1;
        self.usage.add_usage_metrics(&response.usage);
        Ok(response.text)
    }

    async fn execute_tool(&self, action: &AgentAction) -> String {
        let Some(tool) = self
            .tools
            .iter()
            .find(|t| t.name().trim().eq_ignore_ascii_case(action.tool.trim()))
        else {
            let names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
            self.printer
                .warning(&format!("Agent tried unknown tool '{}'", action.tool));
            return unknown_tool(&action.tool, &names);
        };

        log::debug!("Agent '{}' using tool '{}'", self.role, tool.name());
        match tool.run(&action.tool_input).await {
            Ok(observation) => observation,
            Err(e) => {
                log::warn!("Tool '{}' failed: {}", tool.name(), e);
                tool_error(tool.name(), &e.to_string())
            }
        }
    }

    /// Demand an answer after the iteration cap. A reply that still lacks
    /// `Final Answer:` is taken as the answer verbatim.
    async fn force_final_answer(mut self) -> Result<ExecutorOutput, AgentError> {
        log::info!(
            "Agent '{}' reached max iterations ({}), forcing final answer",
            self.role,
            self.max_iter
        );
        self.messages.push(LLMMessage::user(FORCE_FINAL_ANSWER));
        let reply = self.call_llm().await?;
        let output = match parse(&reply) {
            Ok(ParseResult::Finish(finish)) => finish.output,
            _ => reply.trim().to_string(),
        };
        Ok(self.finish(output, true))
    }

    /// An empty answer is accepted; the crew decides whether any task
    /// produced usable output.
    fn finish(self, output: String, forced: bool) -> ExecutorOutput {
        if output.trim().is_empty() {
            log::warn!("Agent '{}' gave an empty final answer", self.role);
        }
        self.printer.final_answer(self.role, &output);
        ExecutorOutput {
            output,
            iterations: self.iterations,
            usage: self.usage,
            forced,
        }
    }
}
