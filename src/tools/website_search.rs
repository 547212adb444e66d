//! Semantic-ish search over a single website's content.
//!
//! The page is scraped, split into chunks, and chunks are ranked by how many
//! query terms they contain.

use async_trait::async_trait;
use serde::Deserialize;

use super::base_tool::{single_argument, BaseTool};
use super::scrape_website::fetch_text;
use crate::utilities::exceptions::ToolError;
use crate::utilities::string_utils::{overlap_score, search_terms};

/// Target chunk size in characters.
pub const CHUNK_CHARS: usize = 500;
/// Chunks returned per search.
pub const TOP_K: usize = 3;

#[derive(Debug, Deserialize)]
struct SearchInput {
    search_query: String,
    #[serde(default)]
    website: Option<String>,
}

/// Search a website's content for a query.
#[derive(Debug, Clone, Default)]
pub struct WebsiteSearchTool {
    /// Fixed site; when unset the input must name one.
    pub website: Option<String>,
    client: reqwest::Client,
}

impl WebsiteSearchTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_website(website: impl Into<String>) -> Self {
        Self {
            website: Some(website.into()),
            client: reqwest::Client::new(),
        }
    }

    fn parse_input(&self, input: &str) -> Result<(String, String), ToolError> {
        let (query, website) = match serde_json::from_str::<SearchInput>(input.trim()) {
            Ok(parsed) => (parsed.search_query, parsed.website),
            Err(_) => (single_argument(input), None),
        };

        let website = website
            .filter(|w| !w.trim().is_empty())
            .or_else(|| self.website.clone())
            .ok_or_else(|| {
                ToolError::InvalidInput(
                    "a website is required: pass {\"search_query\": ..., \"website\": ...}"
                        .to_string(),
                )
            })?;
        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput("search_query must not be empty".to_string()));
        }
        Ok((query, website))
    }
}

/// Split `text` into chunks of roughly `size` characters on line and word
/// boundaries.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > size {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// The `k` chunks sharing the most terms with `query`, best first.
///
/// Chunks with no overlap are never returned; ties keep document order.
pub fn rank_chunks<'a>(query: &str, chunks: &'a [String], k: usize) -> Vec<&'a str> {
    let terms = search_terms(query);
    let mut scored: Vec<(usize, usize, &str)> = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| (overlap_score(&terms, c), i, c.as_str()))
        .filter(|(score, _, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().take(k).map(|(_, _, c)| c).collect()
}

#[async_trait]
impl BaseTool for WebsiteSearchTool {
    fn name(&self) -> &str {
        "Search in a specific website"
    }

    fn description(&self) -> &str {
        "A tool that can be used to semantic search a query from a specific URL content."
    }

    fn args_description(&self) -> String {
        r#"{"search_query": {"description": "Mandatory search query you want to use to search a specific website", "type": "str"}, "website": {"description": "Mandatory valid website URL you want to search on", "type": "str"}}"#
            .to_string()
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let (query, website) = self.parse_input(input)?;
        let text = fetch_text(&self.client, &website).await?;
        let chunks = chunk_text(&text, CHUNK_CHARS);
        let best = rank_chunks(&query, &chunks, TOP_K);

        if best.is_empty() {
            return Ok(format!("No relevant content found on {} for '{}'.", website, query));
        }
        Ok(format!("Relevant Content:\n{}", best.join("\n\n")))
    }
}
