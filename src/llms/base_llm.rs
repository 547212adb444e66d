//! Base LLM trait for the crew runtime.
//!
//! Defines the interface every language model backend implements, plus the
//! message and response types that flow through it.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::LLMError;

/// Role of a chat message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call options supplied by the agent executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Stop sequences; the response is cut at the earliest one.
    pub stop: Vec<String>,
    /// Sampling temperature override for this call.
    pub temperature: Option<f64>,
}

/// Text returned by one LLM call, with its token usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LLMResponse {
    pub text: String,
    pub usage: UsageMetrics,
}

/// Interface implemented by all language model backends.
///
/// Implementations must be shareable across agents, so a single client can
/// serve a whole crew.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier sent to the provider.
    fn model(&self) -> &str;

    /// Send `messages` to the model and return its text reply.
    async fn call(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError>;
}

/// Truncate `content` at the earliest occurrence of any stop word.
pub fn apply_stop_words(content: &str, stop: &[String]) -> String {
    let earliest = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| content.find(s.as_str()))
        .min();

    match earliest {
        Some(pos) => {
            log::debug!("Applied stop word at position {}", pos);
            content[..pos].trim().to_string()
        }
        None => content.to_string(),
    }
}
