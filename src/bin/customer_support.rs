//! Customer support crew CLI.
//!
//! Answers one customer request with a support representative, then has a
//! QA specialist review the answer.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - API key (or `--openai-api-key`)
//! - `OPENAI_MODEL_NAME` - model (default: gpt-3.5-turbo)
//! - `OPENAI_API_BASE` - OpenAI-compatible endpoint
//! - `SERPER_API_KEY` - key for the internet search tool
//! - `RUST_LOG` - tracing filter (default: "info,agent_crews=info")
//!
//! # Usage
//!
//! ```bash
//! customer_support "DeepLearningAI" "How do I add memory to my crew?"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agent_crews::config::{self, LlmSettings};
use agent_crews::crews::customer_support;
use agent_crews::memory::{ShortTermMemory, DEFAULT_MEMORY_FILE};
use agent_crews::tools::missing_env_vars;
use agent_crews::OpenAICompletion;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the customer support crew on one request")]
struct Cli {
    /// Name of the customer being helped
    customer_name: String,

    /// The customer's request
    query: String,

    /// OpenAI API key (falls back to OPENAI_API_KEY)
    #[arg(long)]
    openai_api_key: Option<String>,

    /// Model name (falls back to OPENAI_MODEL_NAME)
    #[arg(long)]
    model: Option<String>,

    /// JSON file holding the crew's short-term memory
    #[arg(long, default_value = DEFAULT_MEMORY_FILE)]
    memory_file: PathBuf,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
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
    let settings = LlmSettings::resolve_with(cli.openai_api_key, cli.model, &env)?;
    let tools = customer_support::create_tools();
    for (tool, var) in missing_env_vars(&tools, &env) {
        tracing::warn!(tool = %tool, "{} is not set ({}); the tool will fail when used", var.name, var.description);
    }

    tracing::info!(model = %settings.model, "Starting customer support crew");
    let llm = OpenAICompletion::new(settings.model, Some(settings.api_key), settings.api_base);
    let memory = ShortTermMemory::load(&cli.memory_file)
        .with_context(|| format!("failed to load memory from {}", cli.memory_file.display()))?;

    let mut crew = customer_support::build_crew(
        &cli.customer_name,
        &cli.query,
        tools,
        Arc::new(llm),
        memory,
    );
    let output = crew
        .kickoff(None)
        .await
        .context("customer support crew failed")?;

    println!("\nFinal Response:");
    println!("{}", output);
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
