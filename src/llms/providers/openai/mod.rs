//! OpenAI chat-completions provider.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint over
//! `reqwest`. Rate limits (429), server errors (5xx) and transport failures
//! are retried with exponential backoff; other client errors fail at once.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llms::base_llm::{apply_stop_words, BaseLLM, CallOptions, LLMMessage, LLMResponse};
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::exceptions::LLMError;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

/// OpenAI completion client.
///
/// # Example
///
/// ```ignore
/// let llm = OpenAICompletion::new("gpt-4o-mini", Some(api_key), None);
/// let reply = llm.call(&[LLMMessage::user("hi")], &CallOptions::default()).await?;
/// ```
#[derive(Clone)]
pub struct OpenAICompletion {
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    /// Default sampling temperature.
    pub temperature: Option<f64>,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub initial_backoff: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAICompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletion")
            .field("model", &self.model)
            .field("base_url", &self.api_base_url())
            .field("has_api_key", &self.api_key.is_some())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAICompletion {
    /// Create a new OpenAI completion provider.
    ///
    /// # Arguments
    ///
    /// * `model` - OpenAI model name (e.g., "gpt-4o", "gpt-3.5-turbo").
    /// * `api_key` - Optional API key (defaults to OPENAI_API_KEY env var).
    /// * `base_url` - Optional custom base URL.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let api_key = api_key.or_else(|| crate::config::get_openai_api_key().ok());
        Self {
            model: model.into(),
            api_key,
            base_url,
            temperature: None,
            timeout: Duration::from_secs(120),
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            client: reqwest::Client::new(),
        }
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage], options: &CallOptions) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = options.temperature.or(self.temperature) {
            body["temperature"] = json!(temp);
        }
        if !options.stop.is_empty() {
            body["stop"] = json!(options.stop);
        }

        body
    }

    /// Extract the reply text and usage from a Chat Completions response.
    pub fn parse_completions_response(
        response: &Value,
        stop: &[String],
    ) -> Result<LLMResponse, LLMError> {
        let invalid = |message: &str| LLMError::InvalidResponse {
            provider: PROVIDER.to_string(),
            message: message.to_string(),
        };

        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| invalid("no choices in response"))?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("");

        let usage = response
            .get("usage")
            .map(UsageMetrics::from_openai_usage)
            .unwrap_or(UsageMetrics {
                successful_requests: 1,
                ..UsageMetrics::default()
            });

        log::debug!(
            "OpenAI token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        );

        Ok(LLMResponse {
            text: apply_stop_words(content, stop),
            usage,
        })
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn call(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LLMError::MissingApiKey {
            provider: PROVIDER.to_string(),
        })?;

        log::debug!(
            "OpenAICompletion.call: model={}, messages={}",
            self.model,
            messages.len(),
        );

        let body = self.build_request_body(messages, options);
        let endpoint = format!("{}/chat/completions", self.api_base_url());

        let mut last_error = String::new();
        let mut retry_delay = self.initial_backoff;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "OpenAI API retry attempt {} after {:?}",
                    attempt,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .bearer_auth(api_key)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "Rate limited by OpenAI API (429)".to_string();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("OpenAI API server error: {}", status);
                continue;
            }

            let response_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(LLMError::Api {
                    provider: PROVIDER.to_string(),
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            let response_json: Value =
                serde_json::from_str(&response_text).map_err(|e| LLMError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    message: format!(
                        "{} - Body: {}",
                        e,
                        crate::utilities::string_utils::truncate_chars(&response_text, 500)
                    ),
                })?;

            return Self::parse_completions_response(&response_json, &options.stop);
        }

        Err(LLMError::RetriesExhausted {
            provider: PROVIDER.to_string(),
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}
