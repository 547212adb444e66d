//! Website scraping tool.
//!
//! Fetches a page and converts its HTML to compact Markdown text.

use std::time::Duration;

use async_trait::async_trait;
use htmd::HtmlToMarkdown;

use super::base_tool::{single_argument, BaseTool};
use crate::utilities::exceptions::ToolError;
use crate::utilities::string_utils::truncate_chars;

/// Upper bound on returned text, to keep observations inside the context window.
pub const MAX_CONTENT_CHARS: usize = 12_000;

const USER_AGENT: &str = concat!("agent-crews/", env!("CARGO_PKG_VERSION"));

/// Elements whose content never reaches the model.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "svg", "head"];

/// Convert an HTML document to Markdown-flavoured text.
///
/// Runs of blank lines are collapsed to one and trailing whitespace is
/// dropped.
pub fn html_to_text(html: &str) -> Result<String, ToolError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();
    let markdown = converter
        .convert(html)
        .map_err(|e| ToolError::InvalidInput(format!("could not convert page to text: {}", e)))?;

    let mut lines: Vec<&str> = Vec::new();
    for line in markdown.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if lines.last().map_or(true, |l| l.is_empty()) {
                continue;
            }
            lines.push("");
        } else {
            lines.push(line);
        }
    }
    Ok(lines.join("\n").trim().to_string())
}

/// Fetch `url` and return its text content.
pub(crate) async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, ToolError> {
    log::debug!("Scraping {}", url);
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(Duration::from_secs(30))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ToolError::Backend {
            status: status.as_u16(),
            body: truncate_chars(&body, 200),
        });
    }
    html_to_text(&body)
}

/// Reads the content of a website.
///
/// With a fixed `website_url` the input is ignored; otherwise the input is
/// the URL to read.
#[derive(Debug, Clone)]
pub struct ScrapeWebsiteTool {
    pub website_url: Option<String>,
    description: String,
    client: reqwest::Client,
}

impl Default for ScrapeWebsiteTool {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScrapeWebsiteTool {
    pub fn new(website_url: Option<String>) -> Self {
        let description = match &website_url {
            Some(url) => format!("A tool that can be used to read {}'s content.", url),
            None => "A tool that can be used to read a website content.".to_string(),
        };
        Self {
            website_url,
            description,
            client: reqwest::Client::new(),
        }
    }

    /// Tool bound to a single page.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()))
    }
}

#[async_trait]
impl BaseTool for ScrapeWebsiteTool {
    fn name(&self) -> &str {
        "Read website content"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_description(&self) -> String {
        match self.website_url {
            Some(_) => "{}".to_string(),
            None => r#"{"website_url": {"description": "Mandatory website url to read the file", "type": "str"}}"#
                .to_string(),
        }
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let url = match &self.website_url {
            Some(url) => url.clone(),
            None => single_argument(input),
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidInput(format!(
                "'{}' is not a valid http(s) URL",
                url
            )));
        }

        let text = fetch_text(&self.client, &url).await?;
        Ok(truncate_chars(&text, MAX_CONTENT_CHARS))
    }
}
