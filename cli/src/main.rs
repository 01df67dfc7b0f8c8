mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{handle_ask, handle_eval, handle_index, handle_status, Cli, Commands};
use docqa_config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Index { data_dir } => {
            handle_index(&config, &data_dir).await?;
        }
        Commands::Ask {
            question,
            top,
            show_sources,
        } => {
            handle_ask(&config, &question, top, show_sources).await?;
        }
        Commands::Eval {
            dataset,
            output,
            concurrency,
        } => {
            handle_eval(&config, &dataset, output.as_deref(), concurrency).await?;
        }
        Commands::Status => {
            handle_status(&config)?;
        }
    }

    Ok(())
}
