//! Error types for the crew runtime.
//!
//! One enum per concern; callers at the binary boundary wrap these in
//! `anyhow` with context.

use thiserror::Error;

/// Errors raised while talking to a language model provider.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No API key was configured for the provider.
    #[error("{provider} API key not set. Set OPENAI_API_KEY or pass an api key to the constructor.")]
    MissingApiKey { provider: String },

    /// The provider answered with a non-retryable error status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered with a body we could not interpret.
    #[error("Failed to parse {provider} response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Every retry attempt failed.
    #[error("{provider} API call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        provider: String,
        attempts: u32,
        last_error: String,
    },
}

/// Errors raised by tool execution.
///
/// Most of these are reported back to the model as an observation rather
/// than aborting the agent.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("HTTP error while running tool: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{tool} requires the {env_var} environment variable")]
    MissingApiKey { tool: String, env_var: String },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("Tool backend returned {status}: {body}")]
    Backend { status: u16, body: String },
}

/// Errors raised by the file-backed memory store.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Memory file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Memory file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while an agent works on a task.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent has no language model attached.
    #[error("Agent '{role}' has no LLM configured")]
    NoLlm { role: String },

    #[error(transparent)]
    Llm(#[from] LLMError),
}

/// Errors raised when interpolating `{placeholder}` templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Template variable '{0}' not found in inputs dictionary")]
    MissingVariable(String),
}

/// Errors raised while assembling or running a crew.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("A crew needs at least one task")]
    NoTasks,

    #[error("Task '{task}' is assigned to agent '{role}', which is not part of the crew")]
    UnknownAgent { task: String, role: String },

    #[error("No valid task outputs available to create crew output")]
    NoOutput,

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error("Task '{task}' failed: {source}")]
    Task {
        task: String,
        #[source]
        source: AgentError,
    },
}

/// Configuration errors, raised before any model is called.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0}")]
    MissingApiKey(String),
}
