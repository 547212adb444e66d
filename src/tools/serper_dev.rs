//! Web search through the Serper.dev Google search API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base_tool::{single_argument, BaseTool, EnvVar};
use crate::config::{get_serper_api_key, SERPER_API_KEY_ENV};
use crate::utilities::exceptions::ToolError;
use crate::utilities::string_utils::truncate_chars;

/// Default Serper endpoint.
pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev";

const TOOL_NAME: &str = "Search the internet";

/// Searches the internet for a query and returns the organic results.
#[derive(Debug, Clone)]
pub struct SerperDevTool {
    /// Number of results requested.
    pub n_results: u32,
    base_url: String,
    api_key: Option<String>,
    env_vars: Vec<EnvVar>,
    client: reqwest::Client,
}

impl Default for SerperDevTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SerperDevTool {
    /// Tool reading its key from `SERPER_API_KEY` at run time.
    pub fn new() -> Self {
        Self {
            n_results: 10,
            base_url: DEFAULT_SERPER_URL.to_string(),
            api_key: None,
            env_vars: vec![EnvVar::new(SERPER_API_KEY_ENV, "API key for Serper")],
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_n_results(mut self, n_results: u32) -> Self {
        self.n_results = n_results.max(1);
        self
    }

    fn resolve_api_key(&self) -> Result<String, ToolError> {
        self.api_key
            .clone()
            .or_else(|| get_serper_api_key().ok())
            .ok_or_else(|| ToolError::MissingApiKey {
                tool: TOOL_NAME.to_string(),
                env_var: SERPER_API_KEY_ENV.to_string(),
            })
    }

    /// Render Serper's organic results as plain text blocks.
    pub fn format_results(response: &Value) -> String {
        let organic = response
            .get("organic")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if organic.is_empty() {
            return "No results found.".to_string();
        }

        organic
            .iter()
            .map(|item| {
                let field = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or("");
                format!(
                    "Title: {}\nLink: {}\nSnippet: {}\n---",
                    field("title"),
                    field("link"),
                    field("snippet")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl BaseTool for SerperDevTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A tool that can be used to search the internet with a search_query."
    }

    fn args_description(&self) -> String {
        r#"{"search_query": {"description": "Mandatory search query you want to use to search the internet", "type": "str"}}"#
            .to_string()
    }

    fn env_vars(&self) -> &[EnvVar] {
        &self.env_vars
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let query = single_argument(input);
        if query.is_empty() {
            return Err(ToolError::InvalidInput("search_query must not be empty".to_string()));
        }
        let api_key = self.resolve_api_key()?;

        log::debug!("Serper search: {}", query);
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", api_key)
            .timeout(Duration::from_secs(30))
            .json(&json!({ "q": query, "num": self.n_results }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Backend {
                status: status.as_u16(),
                body: truncate_chars(&body, 200),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::format_results(&body))
    }
}
