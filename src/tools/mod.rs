//! Tools agents can call during the ReAct loop.
//!
//! Every tool implements [`BaseTool`]: it gets the raw `Action Input` text
//! and returns the observation fed back to the model.

pub mod base_tool;
pub mod customer_history;
pub mod scrape_website;
pub mod serper_dev;
pub mod website_search;

// Re-exports for convenience
pub use base_tool::{missing_env_vars, render_text_description, BaseTool, EnvVar, Tool};
pub use customer_history::customer_history_tool;
pub use scrape_website::ScrapeWebsiteTool;
pub use serper_dev::SerperDevTool;
pub use website_search::WebsiteSearchTool;
