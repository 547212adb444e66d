//! Token usage accounting for crew execution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token usage summed over one or more LLM calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total number of tokens used.
    pub total_tokens: u64,
    /// Number of tokens used in prompts.
    pub prompt_tokens: u64,
    /// Number of cached prompt tokens used.
    pub cached_prompt_tokens: u64,
    /// Number of tokens used in completions.
    pub completion_tokens: u64,
    /// Number of successful requests made.
    pub successful_requests: u64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metrics for one successful request from a chat-completions
    /// `usage` object. Missing fields count as zero.
    pub fn from_openai_usage(usage: &Value) -> Self {
        let field = |name: &str| usage.get(name).and_then(Value::as_u64).unwrap_or(0);
        let cached = usage
            .get("prompt_tokens_details")
            .and_then(|d| d.get("cached_tokens"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Self {
            total_tokens: field("total_tokens"),
            prompt_tokens: field("prompt_tokens"),
            cached_prompt_tokens: cached,
            completion_tokens: field("completion_tokens"),
            successful_requests: 1,
        }
    }

    /// Add usage metrics from another UsageMetrics object.
    pub fn add_usage_metrics(&mut self, other: &UsageMetrics) {
        self.total_tokens += other.total_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.cached_prompt_tokens += other.cached_prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.successful_requests += other.successful_requests;
    }
}
