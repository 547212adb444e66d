//! Prompt slices and the builder that assembles them for an agent.
//!
//! The system prompt is role playing plus either the tool instructions or
//! the no-tools answer format. The user prompt carries the task.

use std::sync::Arc;

use crate::tools::base_tool::{render_text_description, BaseTool};

const ROLE_PLAYING: &str = "You are {role}. {backstory}\nYour personal goal is: {goal}";

const TOOLS: &str = "\nYou ONLY have access to the following tools, and should NEVER make up tools that are not listed here:\n\n{tools}\n\nIMPORTANT: Use the following format in your response:\n\n```\nThought: you should always think about what to do\nAction: the action to take, only one name of [{tool_names}], just the name, exactly as it's written.\nAction Input: the input to the action, just a simple JSON object, enclosed in curly braces, using \" to wrap keys and values.\nObservation: the result of the action\n```\n\nOnce all necessary information is gathered, return the following format:\n\n```\nThought: I now know the final answer\nFinal Answer: the final answer to the original input question\n```";

const NO_TOOLS: &str = "\nTo give my best complete final answer to the task respond using the exact following format:\n\nThought: I now can give a great answer\nFinal Answer: Your final answer must be the great and the most complete as possible, it must be outcome described.\n\nI MUST use these formats, my job depends on it!";

const TASK: &str = "\nCurrent Task: {input}\n\nBegin! This is VERY important to you, use the tools available and give your best Final Answer, your job depends on it!\n\nThought:";

const TASK_NO_TOOLS: &str = "\nCurrent Task: {input}\n\nBegin! This is VERY important to you, give your best Final Answer, your job depends on it!\n\nThought:";

const TASK_WITH_CONTEXT: &str = "{task}\n\nThis is the context you're working with:\n{context}";

const MEMORY: &str = "\n\n# Useful context: \n{memory}";

/// Sent after the iteration cap to demand an answer.
pub const FORCE_FINAL_ANSWER: &str = "Now it's time you MUST give your absolute best final answer. You'll ignore all previous instructions, stop using any tools, and just return your absolute BEST Final answer.";

/// Observation for a tool name the model made up.
pub fn unknown_tool(tool: &str, available: &[&str]) -> String {
    format!(
        "Action '{}' don't exist, these are the only available Actions:\n{}",
        tool,
        available.join(", ")
    )
}

/// Observation for a tool that failed.
pub fn tool_error(tool: &str, error: &str) -> String {
    format!(
        "\nI encountered an error while trying to use the tool. This was the error: {}.\n Tool {} accepts these inputs: see the tool description above",
        error, tool
    )
}

/// Append the outputs of earlier tasks to a task prompt.
pub fn task_with_context(task: &str, context: &str) -> String {
    if context.trim().is_empty() {
        return task.to_string();
    }
    TASK_WITH_CONTEXT
        .replace("{task}", task)
        .replace("{context}", context)
}

/// Append recalled memory to a task prompt.
pub fn task_with_memory(task: &str, memory: &str) -> String {
    if memory.trim().is_empty() {
        return task.to_string();
    }
    format!("{}{}", task, MEMORY.replace("{memory}", memory))
}

/// Agent info needed for prompt interpolation.
pub struct AgentInfo<'a> {
    pub role: &'a str,
    pub goal: &'a str,
    pub backstory: &'a str,
}

/// System and user prompt pair for one task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPromptResult {
    pub system: String,
    pub user: String,
}

/// Builds ReAct prompts for an agent and its tools.
#[derive(Debug, Clone)]
pub struct Prompts<'a> {
    tools: &'a [Arc<dyn BaseTool>],
}

impl<'a> Prompts<'a> {
    pub fn new(tools: &'a [Arc<dyn BaseTool>]) -> Self {
        Self { tools }
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Comma-separated tool names, as listed in the format instructions.
    pub fn tool_names(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Prompts for running `input` as `agent`.
    pub fn task_execution(&self, agent: &AgentInfo<'_>, input: &str) -> SystemPromptResult {
        let (format_slice, task_slice) = if self.has_tools() {
            let tools = TOOLS
                .replace("{tools}", &render_text_description(self.tools))
                .replace("{tool_names}", &self.tool_names());
            (tools, TASK)
        } else {
            (NO_TOOLS.to_string(), TASK_NO_TOOLS)
        };

        let system = format!("{}{}", ROLE_PLAYING, format_slice)
            .replace("{role}", agent.role)
            .replace("{backstory}", agent.backstory)
            .replace("{goal}", agent.goal);
        let user = task_slice.replace("{input}", input);

        SystemPromptResult { system, user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EchoTool;

    const AGENT: AgentInfo<'static> = AgentInfo {
        role: "Editor",
        goal: "Edit posts",
        backstory: "You edit.",
    };

    #[test]
    fn test_prompt_without_tools() {
        let prompts = Prompts::new(&[]);
        let result = prompts.task_execution(&AGENT, "Proofread it.");
        assert!(result
            .system
            .starts_with("You are Editor. You edit.\nYour personal goal is: Edit posts"));
        assert!(result.system.contains("Thought: I now can give a great answer"));
        assert!(result.user.starts_with("\nCurrent Task: Proofread it."));
        assert!(!result.user.contains("use the tools available"));
    }

    #[test]
    fn test_prompt_lists_tools() {
        let tools: Vec<Arc<dyn BaseTool>> = vec![EchoTool::new("alpha"), EchoTool::new("beta")];
        let prompts = Prompts::new(&tools);
        let result = prompts.task_execution(&AGENT, "Do it.");
        assert!(result.system.contains("Tool Name: alpha"));
        assert!(result.system.contains("only one name of [alpha, beta]"));
        assert!(result.user.contains("use the tools available"));
    }

    #[test]
    fn test_context_and_memory_are_skipped_when_empty() {
        assert_eq!(task_with_context("T", ""), "T");
        assert_eq!(task_with_memory("T", "  "), "T");
        assert_eq!(
            task_with_context("T", "prior"),
            "T\n\nThis is the context you're working with:\nprior"
        );
        assert_eq!(
            task_with_memory("T", "Recent Insights:\n- x"),
            "T\n\n# Useful context: \nRecent Insights:\n- x"
        );
    }

    #[test]
    fn test_unknown_tool_lists_available() {
        assert_eq!(
            unknown_tool("web", &["a", "b"]),
            "Action 'web' don't exist, these are the only available Actions:\na, b"
        );
    }
}
