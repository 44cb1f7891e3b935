use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

mod args;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Validate => commands::validate::validate(&cli),
        Commands::Machines => commands::machines(&cli),
        Commands::Create(args) => commands::create::create(args, &cli).await,
        Commands::Status => commands::status::status(&cli).await,
        Commands::Ssh(args) => commands::status::ssh(args, &cli).await,
        Commands::Halt => commands::destroy::halt(&cli).await,
        Commands::Destroy => commands::destroy::destroy(&cli).await,
        Commands::Clean => commands::destroy::clean(&cli).await,
        Commands::Import(args) => commands::import::import(args, &cli),
    }
}
