//! Subsidy CLI - Energy-saving subsidy matcher
//!
//! Usage:
//!   subsidy search --tax-id 12345678 --industry 1   Search subsidies for a profile
//!   subsidy catalog                                 List the profile field options
//!   subsidy prompt --list                           Show prompts and overrides
//!   subsidy serve --port 3000                       Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { profile, json } => commands::cmd_search(&config, &profile, json).await,
        Commands::Serve { port, host } => commands::cmd_serve(config, host, port).await,
        Commands::Catalog { json } => commands::cmd_catalog(json),
        Commands::Prompt { profile, list } => {
            if list {
                commands::cmd_prompt_list()
            } else {
                commands::cmd_prompt_show(&config, &profile)
            }
        }
        Commands::Config => commands::cmd_config(&config, cli.config.as_deref()),
    }
}
