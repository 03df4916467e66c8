use anyhow::{Context, Result};
use clap::Parser;
use std::env;

use scout::agent::DEFAULT_MAX_ITERATIONS;
use scout::providers::configs::{OpenAiProviderConfig, OPENAI_MODEL};
use scout::tools::ToolConfig;
use scout::turn::{resolve_api_key, AgentConfig};

mod prompt;
mod session;

use prompt::cliclack::CliclackPrompt;
use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI API Key (can also be set via OPENAI_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use
    #[arg(short, long, default_value = OPENAI_MODEL)]
    model: String,

    /// Most model calls the agent may make for one question
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Wait for complete model replies instead of streaming them
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let api_key = resolve_api_key(
        cli.api_key.as_deref(),
        env::var("OPENAI_API_KEY").ok().as_deref(),
    )
    .context("API key must be provided via --api-key or OPENAI_API_KEY environment variable")?;

    let mut provider = OpenAiProviderConfig::new(api_key);
    provider.model = cli.model;
    provider.stream = !cli.no_stream;

    let config = AgentConfig {
        provider,
        tools: ToolConfig::default(),
        max_iterations: cli.max_iterations,
    };
    let agent = config.build(None)?;

    let mut session = Session::new(agent, Box::new(CliclackPrompt::new()));
    session.start().await
}
