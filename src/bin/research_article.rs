//! Research article crew CLI.
//!
//! Plans, writes and edits a blog post on a topic, then prints it as
//! rendered Markdown.
//!
//! # Usage
//!
//! ```bash
//! research_article "Artificial Intelligence"
//! research_article "Rust async runtimes" --plain
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agent_crews::config::{self, LlmSettings};
use agent_crews::crews::research_article;
use agent_crews::utilities::markdown;
use agent_crews::OpenAICompletion;

#[derive(Parser, Debug)]
#[command(author, version, about = "Write a blog post with the research article crew")]
struct Cli {
    /// Topic of the article
    topic: String,

    /// OpenAI API key (falls back to OPENAI_API_KEY)
    #[arg(long)]
    openai_api_key: Option<String>,

    /// Model name (falls back to OPENAI_MODEL_NAME)
    #[arg(long)]
    model: Option<String>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the article without Markdown styling
    #[arg(long)]
    plain: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "debug,agent_crews=debug"
    } else {
        "info,agent_crews=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn run(cli: Cli) -> Result<()> {
    run_with(cli, config::non_empty_env).await
}

/// Run the crew, reading configuration through `env`.
async fn run_with<F>(cli: Cli, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = LlmSettings::resolve_with(cli.openai_api_key, cli.model, env)?;

    tracing::info!(model = %settings.model, topic = %cli.topic, "Starting research article crew");
    let llm = OpenAICompletion::new(settings.model, Some(settings.api_key), settings.api_base);

    let mut crew = research_article::build_crew(Arc::new(llm));
    let output = crew
        .kickoff(Some(research_article::inputs(&cli.topic)))
        .await
        .context("research article crew failed")?;

    if cli.plain {
        config::pretty_print_result(&output.raw).context("failed to write result")?;
    } else {
        markdown::print(&output.raw).context("failed to write result")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_and_flags() {
        let cli = Cli::try_parse_from(["research_article", "Rust", "--plain", "-v"]).unwrap();
        assert_eq!(cli.topic, "Rust");
        assert!(cli.plain);
        assert!(cli.verbose);
        assert!(cli.openai_api_key.is_none());
    }

    #[test]
    fn test_topic_is_required() {
        assert!(Cli::try_parse_from(["research_article"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let cli = Cli::try_parse_from(["research_article", "Rust"]).unwrap();
        let err = run_with(cli, |_: &str| None).await.unwrap_err();
        assert!(format!("{:#}", err).contains("OpenAI API key is required"));
    }

    #[tokio::test]
    async fn test_blank_flag_key_is_ignored() {
        let cli =
            Cli::try_parse_from(["research_article", "Rust", "--openai-api-key", "  "]).unwrap();
        let err = run_with(cli, |_: &str| None).await.unwrap_err();
        assert!(format!("{:#}", err).contains("OpenAI API key is required"));
    }
}
