//! citycrew CLI
//!
//! Runs the city workflow once and prints the chosen city, the famous
//! things found, and the final explanation.
//!
//! Usage:
//!   citycrew
//!   citycrew --agents config/agents.yaml --tasks config/tasks.yaml -v

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use citycrew::config::load_credentials;
use citycrew::{GeminiAgentFactory, WorkflowEngine};
use citycrew_agent::LlmSettings;

#[derive(Parser)]
#[command(name = "citycrew")]
#[command(about = "Pick a random Indian city, find what it is famous for, and explain it")]
struct Cli {
    /// Agents document (YAML or TOML)
    #[arg(long, default_value = "config/agents.yaml")]
    agents: PathBuf,

    /// Tasks document (YAML or TOML)
    #[arg(long, default_value = "config/tasks.yaml")]
    tasks: PathBuf,

    /// Default model for agents that don't specify one
    #[arg(short = 'm', long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL")]
    base_url: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Initialize tracing with the given verbosity level
///
/// - 0: warn (default)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Both credentials must be present before anything else happens
    let credentials = load_credentials()?;

    let settings = LlmSettings {
        base_url: cli.base_url.unwrap_or_else(LlmSettings::default_base_url),
        model: cli.model.unwrap_or_else(LlmSettings::default_model),
    };
    tracing::info!(model = %settings.model, "Using model");

    let factory = GeminiAgentFactory::new(settings, credentials);
    let engine = WorkflowEngine::from_config(&cli.agents, &cli.tasks, &factory)?;

    let outcome = engine.run().await?;

    println!("Chosen city: {}", outcome.city);
    println!("\n=== Famous Things ===");
    println!("{}", outcome.famous_things);
    println!("\n=== Final Output ===");
    println!("{}", outcome.explanation);

    tracing::info!(
        total_ms = outcome.total_duration_ms(),
        steps = outcome.steps.len(),
        "Workflow completed"
    );

    Ok(())
}
