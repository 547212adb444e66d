//! Base tool definitions.
//!
//! Provides `EnvVar`, the `BaseTool` trait, the function-backed `Tool`, and
//! helpers for describing tools to the model and unwrapping their input.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::utilities::exceptions::ToolError;

/// Environment variable a tool cannot run without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    /// Name of the environment variable.
    pub name: String,
    /// Human-readable description of the environment variable.
    pub description: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Variables of `tools` that `env` has no value for, with the tool
/// needing each.
pub fn missing_env_vars<F>(tools: &[Arc<dyn BaseTool>], env: F) -> Vec<(String, EnvVar)>
where
    F: Fn(&str) -> Option<String>,
{
    tools
        .iter()
        .flat_map(|tool| {
            tool.env_vars()
                .iter()
                .filter(|var| env(&var.name).is_none())
                .map(|var| (tool.name().to_string(), var.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Base trait for all tools an agent can call.
///
/// Tools take the raw `Action Input` text and return the observation text.
#[async_trait]
pub trait BaseTool: Send + Sync + fmt::Debug {
    /// The unique name of the tool that clearly communicates its purpose.
    fn name(&self) -> &str;

    /// Description used to tell the model how/when/why to use the tool.
    fn description(&self) -> &str;

    /// Argument description shown to the model.
    fn args_description(&self) -> String {
        r#"{"input": {"description": "The tool input", "type": "str"}}"#.to_string()
    }

    /// List of environment variables used by the tool.
    fn env_vars(&self) -> &[EnvVar] {
        &[]
    }

    /// Maximum number of times this tool can be used. `None` means unlimited.
    fn max_usage_count(&self) -> Option<u32> {
        None
    }

    /// Number of successful runs so far.
    fn current_usage_count(&self) -> u32 {
        0
    }

    /// Execute the tool.
    async fn run(&self, input: &str) -> Result<String, ToolError>;
}

/// Type alias for a synchronous tool function.
pub type ToolFn = Arc<dyn Fn(&str) -> Result<String, ToolError> + Send + Sync>;

/// Concrete tool that wraps a callable function.
#[derive(Clone)]
pub struct Tool {
    tool_name: String,
    tool_description: String,
    tool_args_description: Option<String>,
    /// The wrapped function.
    pub func: ToolFn,
    tool_max_usage_count: Option<u32>,
    usage_count: Arc<AtomicU32>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.tool_name)
            .field("description", &self.tool_description)
            .field("max_usage_count", &self.tool_max_usage_count)
            .field("current_usage_count", &self.current_usage_count())
            .finish()
    }
}

impl Tool {
    /// Create a new Tool wrapping the given function.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: description.into(),
            tool_args_description: None,
            func: Arc::new(func),
            tool_max_usage_count: None,
            usage_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Builder method to describe the single argument shown to the model.
    pub fn with_args_description(mut self, args: impl Into<String>) -> Self {
        self.tool_args_description = Some(args.into());
        self
    }

    /// Builder method to set the maximum usage count.
    pub fn with_max_usage_count(mut self, max_usage_count: Option<u32>) -> Self {
        self.tool_max_usage_count = max_usage_count.filter(|c| *c > 0);
        self
    }
}

#[async_trait]
impl BaseTool for Tool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.tool_description
    }

    fn args_description(&self) -> String {
        self.tool_args_description.clone().unwrap_or_else(|| {
            r#"{"input": {"description": "The tool input", "type": "str"}}"#.to_string()
        })
    }

    fn max_usage_count(&self) -> Option<u32> {
        self.tool_max_usage_count
    }

    fn current_usage_count(&self) -> u32 {
        self.usage_count.load(Ordering::SeqCst)
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        if let Some(max) = self.tool_max_usage_count {
            if self.current_usage_count() >= max {
                return Err(ToolError::InvalidInput(format!(
                    "Tool '{}' has reached its usage limit of {} times and cannot be used anymore.",
                    self.tool_name, max
                )));
            }
        }
        let result = (self.func)(&single_argument(input))?;
        self.usage_count.fetch_add(1, Ordering::SeqCst);
        Ok(result)
    }
}

/// Render the tool list the way the agent prompt presents it.
pub fn render_text_description(tools: &[Arc<dyn BaseTool>]) -> String {
    tools
        .iter()
        .map(|t| {
            format!(
                "Tool Name: {}\nTool Arguments: {}\nTool Description: {}",
                t.name(),
                t.args_description(),
                t.description()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reduce an `Action Input` to a single plain argument.
///
/// Models often wrap a lone argument in JSON (`{"customer_name": "Ann"}`) or
/// quotes; single-argument tools want just `Ann`. Inputs with several keys
/// are returned unchanged.
pub fn single_argument(input: &str) -> String {
    let trimmed = input.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) if map.len() == 1 => match map.values().next() {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        Ok(Value::String(s)) => s.trim().to_string(),
        _ => trimmed.trim_matches(|c| c == '"' || c == '\'').trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_argument_unwraps_json_object() {
        assert_eq!(single_argument(r#"{"customer_name": "Ann"}"#), "Ann");
    }

    #[test]
    fn test_single_argument_unwraps_quotes() {
        assert_eq!(single_argument("\"crew kickoff\""), "crew kickoff");
        assert_eq!(single_argument("plain text"), "plain text");
    }

    #[test]
    fn test_single_argument_keeps_multi_key_objects() {
        let raw = r#"{"search_query": "memory", "website": "https://x.io"}"#;
        assert_eq!(single_argument(raw), raw);
    }

    #[tokio::test]
    async fn test_tool_runs_function_and_counts_usage() {
        let tool = Tool::new("shout", "Upper-cases text", |s: &str| Ok(s.to_uppercase()));
        assert_eq!(tool.run(r#"{"text": "hi"}"#).await.unwrap(), "HI");
        assert_eq!(tool.current_usage_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_usage_limit() {
        let tool = Tool::new("once", "Runs once", |_: &str| Ok("ok".to_string()))
            .with_max_usage_count(Some(1));
        assert!(tool.run("a").await.is_ok());
        assert!(tool.run("b").await.is_err());
    }

    #[derive(Debug)]
    struct NeedsKey;

    #[async_trait]
    impl BaseTool for NeedsKey {
        fn name(&self) -> &str {
            "needs key"
        }

        fn description(&self) -> &str {
            "Needs a key."
        }

        fn env_vars(&self) -> &[EnvVar] {
            static VARS: once_cell::sync::Lazy<Vec<EnvVar>> = once_cell::sync::Lazy::new(|| {
                vec![EnvVar::new("AGENT_CREWS_TEST_KEY", "test key")]
            });
            &VARS
        }

        async fn run(&self, _input: &str) -> Result<String, ToolError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_missing_env_vars_lists_unset() {
        let tools: Vec<Arc<dyn BaseTool>> = vec![
            Arc::new(NeedsKey),
            Arc::new(Tool::new("free", "No keys", |_: &str| Ok(String::new()))),
        ];
        let missing = missing_env_vars(&tools, |_: &str| None);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].0, "needs key");
        assert_eq!(missing[0].1.name, "AGENT_CREWS_TEST_KEY");

        let set = missing_env_vars(&tools, |name: &str| {
            (name == "AGENT_CREWS_TEST_KEY").then(|| "k".to_string())
        });
        assert!(set.is_empty());
    }

    #[test]
    fn test_render_text_description() {
        let tool: Arc<dyn BaseTool> = Arc::new(Tool::new("t", "Does t", |_: &str| Ok(String::new())));
        let text = render_text_description(&[tool]);
        assert!(text.starts_with("Tool Name: t\nTool Arguments: "));
        assert!(text.ends_with("Tool Description: Does t"));
    }
}
